//! Send/Sync guarantees for core types.

use femtologging_caller::{
    BacktraceSource, CallerAnnotator, CallerAnnotatorBuilder, FemtoLogger, FemtoStreamHandler,
    FixedFrames, InternalFrames, LevelHooks,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(CallerAnnotatorBuilder: Send, Sync);
    assert_impl_all!(InternalFrames: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(CallerAnnotator: Send, Sync);
    assert_impl_all!(LevelHooks: Send, Sync);
    assert_impl_all!(BacktraceSource: Send, Sync);
    assert_impl_all!(FixedFrames: Send, Sync);
    assert_impl_all!(FemtoStreamHandler: Send, Sync);
    assert_impl_all!(FemtoLogger: Send, Sync);
}
