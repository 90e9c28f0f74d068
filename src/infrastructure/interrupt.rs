use tokio::sync::watch;

/// Creates a connected interrupt handle and signal.
pub fn interrupt_channel() -> (InterruptHandle, InterruptSignal) {
    let (tx, rx) = watch::channel(false);
    (InterruptHandle { tx }, InterruptSignal { rx })
}

/// Trigger side of an interrupt. Once triggered, stays triggered.
#[derive(Debug)]
pub struct InterruptHandle {
    tx: watch::Sender<bool>,
}

impl InterruptHandle {
    pub fn interrupt(&self) {
        self.tx.send_replace(true);
    }

    pub fn subscribe(&self) -> InterruptSignal {
        InterruptSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observer side of an interrupt, cheap to clone and share between waiters.
#[derive(Debug, Clone)]
pub struct InterruptSignal {
    rx: watch::Receiver<bool>,
}

impl InterruptSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the interrupt has been triggered.
    ///
    /// If the handle is dropped without triggering, this never resolves.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        let closed = rx.wait_for(|interrupted| *interrupted).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_interrupt_wakes_waiters() {
        let (handle, signal) = interrupt_channel();
        let waiter = {
            let signal = signal.clone();
            tokio::spawn(async move { signal.triggered().await })
        };

        assert!(!signal.is_triggered());
        handle.interrupt();

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should be woken")
            .unwrap();
        assert!(signal.is_triggered());
        assert!(handle.subscribe().is_triggered());
    }

    #[tokio::test]
    async fn test_dropped_handle_never_fires() {
        let (handle, signal) = interrupt_channel();
        drop(handle);
        let result = tokio::time::timeout(Duration::from_millis(20), signal.triggered()).await;
        assert!(result.is_err());
        assert!(!signal.is_triggered());
    }
}
