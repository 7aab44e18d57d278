//! In-memory stand-ins for the catalog and the transfer client, so the whole
//! job can be exercised without a database or a network.
//!
//! ```rust,ignore
//! use catfetch_core::testing::{MockCatalog, MockTransferClient};
//!
//! let catalog = MockCatalog::new().with_task(DownloadTask::directory(1, "/out", "/data"));
//! let client = MockTransferClient::new().fail_remote("/out", 1);
//! ```

mod mock_catalog;
mod mock_transfer;

pub use mock_catalog::MockCatalog;
pub use mock_transfer::MockTransferClient;
