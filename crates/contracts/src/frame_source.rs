//! FrameSource trait - transport abstraction
//!
//! Decouples the ingestion path from whatever delivers frames (a driver, a
//! network subscriber, a recording or a synthetic generator).

use std::sync::Arc;

use crate::Frame;

/// Frame callback type
///
/// Invoked once per complete sensor revolution, in capture order.
pub type FrameCallback = Arc<dyn Fn(Frame) + Send + Sync>;

/// Frame source trait
///
/// # Example
///
/// ```ignore
/// let source: Box<dyn FrameSource> = open_source();
/// source.listen(Arc::new(|frame| {
///     println!("frame with {} points", frame.len());
/// }));
/// // ...
/// source.stop();
/// ```
pub trait FrameSource: Send + Sync {
    /// Source identifier
    fn source_id(&self) -> &str;

    /// Register the frame callback
    ///
    /// Repeated calls while listening are ignored.
    fn listen(&self, callback: FrameCallback);

    /// Stop producing frames
    fn stop(&self);

    /// Check if currently listening
    fn is_listening(&self) -> bool;
}
