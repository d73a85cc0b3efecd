use tracing::info;

use crate::types::RawRecord;

/// Copy the raw table into an independent staging table. The raw slice is
/// only borrowed; nothing downstream can reach it.
pub fn stage_copy(raw: &[RawRecord]) -> Vec<RawRecord> {
    let staged = raw.to_vec();
    info!(rows = staged.len(), "staged raw table");
    staged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_copy_is_independent() {
        let raw = vec![RawRecord::new(2, "Oda"), RawRecord::new(3, "Atlassian")];
        let mut staged = stage_copy(&raw);

        staged[0].company.push_str(" AS");
        staged.pop();

        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].company, "Oda");
        assert_eq!(staged, vec![{
            let mut r = RawRecord::new(2, "Oda");
            r.company = "Oda AS".to_string();
            r
        }]);
    }
}
