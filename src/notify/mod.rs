pub mod sheets;
pub mod telegram;
pub mod traits;

pub use sheets::GoogleSheetsSink;
pub use telegram::TelegramNotifier;
pub use traits::{Notifier, RowSink};
