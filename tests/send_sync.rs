//! Send/Sync guarantees for core types.

use rstest::rstest;
use static_assertions::assert_impl_all;
use transmit_http::{
    BatchCollector, DeliveryCoordinator, HttpTransport, ImmediateSend, RateLimitedWarner,
    ScheduledSend, StrategySlot, Transmitter, TransmitterBuilder, TransmitterConfig, UnloadHandle,
};

#[rstest]
fn configuration_is_send_sync() {
    assert_impl_all!(TransmitterBuilder: Send, Sync);
    assert_impl_all!(TransmitterConfig: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(Transmitter: Send, Sync);
    assert_impl_all!(UnloadHandle: Send, Sync);
    assert_impl_all!(BatchCollector: Send, Sync);
    assert_impl_all!(DeliveryCoordinator: Send, Sync);
    assert_impl_all!(ScheduledSend: Send, Sync);
    assert_impl_all!(ImmediateSend: Send, Sync);
    assert_impl_all!(StrategySlot: Send, Sync);
    assert_impl_all!(HttpTransport: Send, Sync);
    assert_impl_all!(RateLimitedWarner: Send, Sync);
}
