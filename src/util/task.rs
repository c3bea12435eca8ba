use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// Runs `future`, converting a panic into its message.
///
/// Spawned fetch tasks use this so a panic still produces a completion event
/// and the UI never stays stuck in a loading state.
///
/// ```ignore
/// tokio::spawn(async move {
///     let outcome = match catch_task_panic(client.fetch_page(page)).await {
///         Ok(outcome) => outcome,
///         Err(panic_msg) => Err(FetchError::Interrupted(panic_msg)),
///     };
///     let _ = tx.send(AppEvent::PageLoaded { request, outcome }).await;
/// });
/// ```
pub async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            }
        })
}
