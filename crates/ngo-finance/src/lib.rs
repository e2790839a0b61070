pub mod entry;
pub mod report;

pub use entry::{
    LedgerEntryRequest, PURCHASE_CATEGORY, SALE_CATEGORY, purchase_entry, sale_entry,
};
pub use report::{purchase_history, summarize};

use ngo_core::{InventoryError, InventoryResult};

pub const STUDENT_ID_PREFIX: &str = "STU-";
pub const ALUMNI_ID_PREFIX: &str = "ALU-";

/// Maps `STU-<n>` to `ALU-<n>` for relabelling ledger rows of a graduate.
pub fn alumni_id_for(student_id: &str) -> InventoryResult<String> {
    let student_id = student_id.trim();
    match student_id.strip_prefix(STUDENT_ID_PREFIX) {
        Some(suffix) if !suffix.is_empty() => Ok(format!("{ALUMNI_ID_PREFIX}{suffix}")),
        _ => Err(InventoryError::InvalidFormat(format!(
            "student id must start with {STUDENT_ID_PREFIX}, found {student_id:?}"
        ))),
    }
}
