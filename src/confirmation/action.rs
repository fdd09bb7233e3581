use async_trait::async_trait;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use super::ConfirmationError;

/// The side effect a confirmation performs, usually one API call.
///
/// Return `Ok(())` on success and an error describing the failure
/// otherwise. Panics are tolerated: [`invoke`] turns them into
/// [`ConfirmationError::ActionPanicked`].
#[async_trait]
pub trait ConfirmationAction<I>: Send + Sync {
    async fn apply(&self, item: &I) -> anyhow::Result<()>;
}

/// Runs `action` once for `item`, funnelling returned errors and panics
/// (raised when the action is called or while its future is polled) into a
/// single error channel.
pub async fn invoke<I, A>(action: &A, item: &I) -> Result<(), ConfirmationError>
where
    I: Sync,
    A: ConfirmationAction<I> + ?Sized,
{
    let future = match panic::catch_unwind(AssertUnwindSafe(|| action.apply(item))) {
        Ok(future) => future,
        Err(payload) => {
            return Err(ConfirmationError::ActionPanicked {
                message: panic_message(payload.as_ref()),
            })
        }
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(source)) => Err(ConfirmationError::ActionFailed { source }),
        Err(payload) => Err(ConfirmationError::ActionPanicked {
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
