//! Mock tag reader.

use crate::{
    HardwareError, Result,
    traits::{TagRead, TagReader},
};
use tokio::sync::mpsc;

/// Mock tag reader fed through a [`MockTagReaderHandle`].
///
/// Each presented tag is returned by exactly one `poll_tag` call.
///
/// # Examples
///
/// ```
/// use portaria_hardware::mock::MockTagReader;
/// use portaria_hardware::traits::TagReader;
///
/// #[tokio::main]
/// async fn main() -> portaria_hardware::Result<()> {
///     let (mut reader, handle) = MockTagReader::new("outside");
///
///     assert!(reader.poll_tag().await?.is_none());
///
///     handle.present(vec![0x04, 0xAB, 0xCD, 0xEF]).await?;
///     let read = reader.poll_tag().await?.unwrap();
///     assert_eq!(read.uid_hex(), "04ABCDEF");
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockTagReader {
    event_rx: mpsc::Receiver<ReaderEvent>,
    name: String,
}

#[derive(Debug)]
enum ReaderEvent {
    Presented(TagRead),
    Fault(String),
}

impl MockTagReader {
    /// Create a reader and its handle.
    pub fn new(name: impl Into<String>) -> (Self, MockTagReaderHandle) {
        let name = name.into();
        let (event_tx, event_rx) = mpsc::channel(32);

        let reader = Self {
            event_rx,
            name: name.clone(),
        };
        let handle = MockTagReaderHandle { event_tx, name };

        (reader, handle)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TagReader for MockTagReader {
    async fn poll_tag(&mut self) -> Result<Option<TagRead>> {
        match self.event_rx.try_recv() {
            Ok(ReaderEvent::Presented(read)) => Ok(Some(read)),
            Ok(ReaderEvent::Fault(message)) => Err(HardwareError::tag_read(message)),
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => {
                Err(HardwareError::disconnected(self.name.clone()))
            }
        }
    }
}

/// Handle for presenting tags to a [`MockTagReader`].
#[derive(Debug, Clone)]
pub struct MockTagReaderHandle {
    event_tx: mpsc::Sender<ReaderEvent>,
    name: String,
}

impl MockTagReaderHandle {
    /// Present a tag by UID bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the UID length is invalid or the reader was dropped.
    pub async fn present(&self, uid: Vec<u8>) -> Result<()> {
        let read = TagRead::new(uid)?;
        self.send(ReaderEvent::Presented(read)).await
    }

    /// Present a tag by its hexadecimal UID.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid hex or the UID length is
    /// invalid.
    pub async fn present_hex(&self, uid_hex: &str) -> Result<()> {
        let uid = hex::decode(uid_hex.trim())
            .map_err(|e| HardwareError::invalid_data(format!("Invalid tag UID: {e}")))?;
        self.present(uid).await
    }

    /// Make the next poll fail with a read error.
    ///
    /// # Errors
    ///
    /// Returns an error if the reader was dropped.
    pub async fn fail_next(&self, message: impl Into<String>) -> Result<()> {
        self.send(ReaderEvent::Fault(message.into())).await
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, event: ReaderEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|_| HardwareError::disconnected(self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_poll_without_tag() {
        let (mut reader, _handle) = MockTagReader::new("inside");
        assert!(reader.poll_tag().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_each_presentation_read_once() {
        let (mut reader, handle) = MockTagReader::new("outside");

        handle.present_hex("deadbeef").await.unwrap();

        let read = reader.poll_tag().await.unwrap().unwrap();
        assert_eq!(read.uid, vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(reader.poll_tag().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let (mut reader, handle) = MockTagReader::new("outside");

        handle.fail_next("collision").await.unwrap();
        handle.present(vec![1, 2, 3, 4]).await.unwrap();

        assert!(matches!(
            reader.poll_tag().await,
            Err(HardwareError::TagReadError { .. })
        ));
        assert!(reader.poll_tag().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_invalid_presentations_rejected() {
        let (_reader, handle) = MockTagReader::new("outside");

        assert!(handle.present(vec![1, 2]).await.is_err());
        assert!(handle.present_hex("xyz").await.is_err());
    }

    #[tokio::test]
    async fn test_dropped_handle_disconnects() {
        let (mut reader, handle) = MockTagReader::new("outside");
        drop(handle);

        assert!(matches!(
            reader.poll_tag().await,
            Err(HardwareError::Disconnected { .. })
        ));
    }
}
