mod common;

use std::time::Duration;

use farm_timers::domain::{CustomDuration, UserId};

use common::{CountingNotifier, Harness};

const USER: UserId = UserId(42);

#[tokio::test]
async fn should_notify_only_once_per_activation() {
    let h = Harness::new();
    let scheduler = h.scheduler();

    h.store.activate(USER, "Питомец", 0).await.unwrap();

    h.clock.set(899);
    let r = scheduler.scan_once().await.unwrap();
    assert_eq!(r.due, 0);

    h.clock.set(900);
    let r = scheduler.scan_once().await.unwrap();
    assert_eq!(r.delivered, 1);

    // rescanning the same activation must not fire again
    h.clock.set(960);
    let r = scheduler.scan_once().await.unwrap();
    assert_eq!(r.due, 0);

    assert_eq!(h.notifier.count(), 1);
    let sent = h.notifier.sent();
    assert_eq!(sent[0].user_id, USER);
    assert_eq!(sent[0].text, "🔔 Задание \"Питомец\" снова доступно!");
    assert!(h.store.outbox().is_empty());
}

#[tokio::test]
async fn failed_delivery_stays_pending_and_retries() {
    let h = Harness::new();
    let scheduler = h.scheduler();
    h.store.activate(USER, "Moto", 0).await.unwrap();

    h.notifier.set_failing(true);
    h.clock.set(7200);
    let r = scheduler.scan_once().await.unwrap();
    assert_eq!((r.delivered, r.failed), (0, 1));
    assert_eq!(h.store.outbox().len(), 1);

    h.notifier.set_failing(false);
    h.clock.set(7260);
    let r = scheduler.scan_once().await.unwrap();
    assert_eq!((r.delivered, r.failed), (1, 0));
    assert_eq!(h.notifier.count(), 1);
    assert_eq!(h.notifier.attempts(), 2);
}

#[tokio::test]
async fn stuck_transport_times_out_and_retries() {
    let h = Harness::new();
    let slow = CountingNotifier::slow(Duration::from_secs(30));
    let scheduler = h
        .scheduler_with(slow.clone())
        .with_delivery_timeout(Duration::from_millis(50));
    h.store.activate(USER, "Релог", 0).await.unwrap();

    h.clock.set(900);
    let r = scheduler.scan_once().await.unwrap();
    assert_eq!(r.failed, 1);
    assert_eq!(slow.count(), 0);
    assert_eq!(h.store.outbox().len(), 1);
}

#[tokio::test]
async fn deactivation_cancels_pending_notification() {
    let h = Harness::new();
    let scheduler = h.scheduler();
    h.store.activate(USER, "Moto", 0).await.unwrap();
    assert!(h.store.deactivate(USER, "Moto").await.unwrap());

    h.clock.set(10_000);
    let r = scheduler.scan_once().await.unwrap();
    assert_eq!(r.due, 0);
    assert_eq!(h.notifier.count(), 0);
}

#[tokio::test]
async fn reactivation_supersedes_earlier_pending_entry() {
    let h = Harness::new();
    let scheduler = h.scheduler();
    h.store.activate(USER, "Питомец", 0).await.unwrap();
    h.store.activate(USER, "Питомец", 500).await.unwrap();
    assert_eq!(h.store.outbox().len(), 1);

    h.clock.set(900);
    assert_eq!(scheduler.scan_once().await.unwrap().due, 0);

    h.clock.set(1400);
    assert_eq!(scheduler.scan_once().await.unwrap().delivered, 1);
    assert_eq!(h.notifier.count(), 1);
}

#[tokio::test]
async fn one_second_custom_timer_fires_after_one_second() {
    let h = Harness::new();
    let scheduler = h.scheduler();
    let d = CustomDuration::from_secs(1).unwrap();
    let record = h.store.activate_custom(USER, d, 0).await.unwrap();

    assert_eq!(scheduler.scan_once().await.unwrap().due, 0);

    h.clock.set(1);
    assert_eq!(scheduler.scan_once().await.unwrap().delivered, 1);
    assert_eq!(h.notifier.sent()[0].action_name, record.action_name);
}

#[tokio::test]
async fn concurrent_scans_deliver_once() {
    let h = Harness::new();
    let slow = CountingNotifier::slow(Duration::from_millis(20));
    let a = h.scheduler_with(slow.clone());
    let b = h.scheduler_with(slow.clone());
    h.store.activate(USER, "Moto", 0).await.unwrap();
    h.store.activate(UserId(7), "Moto", 0).await.unwrap();

    h.clock.set(7200);
    let (ra, rb) = tokio::join!(a.scan_once(), b.scan_once());
    let (ra, rb) = (ra.unwrap(), rb.unwrap());

    assert_eq!(ra.delivered + rb.delivered, 2);
    assert_eq!(slow.count(), 2);
    assert!(h.store.outbox().is_empty());
}

#[tokio::test]
async fn payment_notice_uses_renewal_text() {
    let h = Harness::new();
    let scheduler = h.scheduler();
    h.store.activate(USER, "Оплата на 29 дней", 0).await.unwrap();

    h.clock.set(29 * 86400);
    scheduler.scan_once().await.unwrap();
    assert_eq!(
        h.notifier.sent()[0].text,
        "🔔 Ваша оплата имущества на 29 дней завершена. Пора продлить!"
    );
}
