mod bill;
mod bill_item;
mod summary;

pub use bill::{Bill, BillInput};
pub use bill_item::{BillItem, BillItemInput};
pub use summary::BillSummary;
