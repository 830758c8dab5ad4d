//! File layout of stage outputs under the data directory.

use std::path::{Path, PathBuf};

/// Where each stage reads and writes, for one harvest configuration.
///
/// Stage files carry the configuration's filename tag so runs with
/// different filters never share a checkpoint.
#[derive(Debug, Clone)]
pub(crate) struct StagePaths {
    pub companies: PathBuf,
    pub details: PathBuf,
    pub web: PathBuf,
    pub plc: PathBuf,
    pub merged: PathBuf,
    pub sni_unique: PathBuf,
    pub sni_mapping: PathBuf,
}

impl StagePaths {
    pub(crate) fn new(data_dir: &Path, tag: &str) -> Self {
        Self {
            companies: data_dir.join("companies").join(format!("companies_{tag}.csv")),
            details: data_dir.join("details").join(format!("details_{tag}.csv")),
            web: data_dir.join("web").join(format!("web-emails_{tag}.csv")),
            plc: data_dir.join("plc").join(format!("plc_{tag}.csv")),
            merged: data_dir.join("out").join("merged.csv"),
            sni_unique: data_dir.join("sni").join("sni_codes_unique.csv"),
            sni_mapping: data_dir.join("sni").join("company_sni.csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_files_carry_the_tag() {
        let paths = StagePaths::new(Path::new("data"), "rev-1-10_nump-5_sort-revenueDesc");

        assert_eq!(
            paths.companies,
            Path::new("data/companies/companies_rev-1-10_nump-5_sort-revenueDesc.csv")
        );
        assert_eq!(
            paths.details,
            Path::new("data/details/details_rev-1-10_nump-5_sort-revenueDesc.csv")
        );
        assert_eq!(
            paths.web,
            Path::new("data/web/web-emails_rev-1-10_nump-5_sort-revenueDesc.csv")
        );
        assert_eq!(paths.plc, Path::new("data/plc/plc_rev-1-10_nump-5_sort-revenueDesc.csv"));
    }

    #[test]
    fn derived_outputs_are_shared_across_tags() {
        let a = StagePaths::new(Path::new("data"), "a");
        let b = StagePaths::new(Path::new("data"), "b");
        assert_eq!(a.merged, b.merged);
        assert_eq!(a.sni_unique, Path::new("data/sni/sni_codes_unique.csv"));
        assert_eq!(a.sni_mapping, Path::new("data/sni/company_sni.csv"));
    }
}
