use super::*;
use crate::search::provider::testing::DelayedAssetLoader;
use std::time::Duration;

fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

type Applied = Arc<Mutex<Vec<(RowPosition, String)>>>;

fn sink(applied: &Applied) -> impl FnOnce(RowPosition, String) + Send + 'static {
    let applied = Arc::clone(applied);
    move |position, asset| applied.lock().unwrap().push((position, asset))
}

#[tokio::test(start_paused = true)]
async fn test_completed_task_removes_itself() {
    let registry = RowTaskRegistry::new();
    let loader = Arc::new(DelayedAssetLoader::new(ms(50)));
    let applied: Applied = Arc::default();
    let position = RowPosition::new(0, 3);

    registry.attach(
        position,
        asset_task(loader, StoreItem::new(1, "Blue Train", "song"), sink(&applied)),
    );
    assert!(registry.is_attached(&position));

    tokio::time::sleep(ms(100)).await;

    assert!(registry.is_empty());
    assert_eq!(
        *applied.lock().unwrap(),
        vec![(position, "Blue Train".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_attach_to_same_position_cancels_previous() {
    let registry = RowTaskRegistry::new();
    let loader = Arc::new(DelayedAssetLoader::new(ms(50)));
    let applied: Applied = Arc::default();
    let position = RowPosition::new(0, 0);

    registry.attach(
        position,
        asset_task(Arc::clone(&loader), StoreItem::new(1, "Old", "song"), sink(&applied)),
    );
    tokio::time::sleep(ms(20)).await;
    registry.attach(
        position,
        asset_task(Arc::clone(&loader), StoreItem::new(2, "New", "song"), sink(&applied)),
    );
    assert_eq!(registry.len(), 1);

    tokio::time::sleep(ms(200)).await;

    assert_eq!(*applied.lock().unwrap(), vec![(position, "New".to_string())]);
    assert_eq!(*loader.loads.lock().unwrap(), vec![1, 2]);
    assert!(registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_distinct_positions_run_independently() {
    let registry = RowTaskRegistry::new();
    let loader = Arc::new(DelayedAssetLoader::new(ms(10)));
    let applied: Applied = Arc::default();

    for row in 0..3 {
        registry.attach(
            RowPosition::new(0, row),
            asset_task(
                Arc::clone(&loader),
                StoreItem::new(row as u64, format!("Item {row}"), "song"),
                sink(&applied),
            ),
        );
    }
    assert_eq!(registry.len(), 3);

    tokio::time::sleep(ms(50)).await;

    assert_eq!(applied.lock().unwrap().len(), 3);
    assert!(registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_all_suppresses_every_pending_result() {
    let registry = RowTaskRegistry::new();
    let loader = Arc::new(DelayedAssetLoader::new(ms(50)));
    let applied: Applied = Arc::default();

    for row in 0..4 {
        registry.attach(
            RowPosition::new(0, row),
            asset_task(
                Arc::clone(&loader),
                StoreItem::new(row as u64, "x", "song"),
                sink(&applied),
            ),
        );
    }
    tokio::time::sleep(ms(10)).await;

    assert_eq!(registry.cancel_all(), 4);
    assert!(registry.is_empty());

    tokio::time::sleep(ms(200)).await;
    assert!(applied.lock().unwrap().is_empty());
    assert_eq!(registry.cancel_all(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stale_completion_is_a_no_op() {
    let registry: RowTaskRegistry<RowPosition> = RowTaskRegistry::new();
    let position = RowPosition::new(1, 1);

    let first = registry.attach(position, |ctx| async move {
        ctx.cancelled().await;
    });
    let second = registry.attach(position, |ctx| async move {
        ctx.cancelled().await;
    });

    assert!(!registry.complete(&position, first));
    assert!(registry.is_attached(&position));
    assert!(registry.complete(&position, second));
    assert!(!registry.is_attached(&position));
}

#[tokio::test(start_paused = true)]
async fn test_task_observes_cancellation_through_context() {
    let registry: RowTaskRegistry<&'static str> = RowTaskRegistry::new();
    let observed = Arc::new(Mutex::new(None));

    registry.attach("cell", {
        let observed = Arc::clone(&observed);
        move |ctx| async move {
            tokio::time::sleep(ms(100)).await;
            *observed.lock().unwrap() = Some(ctx.is_cancelled());
        }
    });
    assert!(registry.cancel(&"cell"));

    tokio::time::sleep(ms(200)).await;

    // The wrapper drops the task at its next suspension point.
    assert_eq!(*observed.lock().unwrap(), None);
}
