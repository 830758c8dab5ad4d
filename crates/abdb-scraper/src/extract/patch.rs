use abdb_core::EntityRecord;

/// A partial record produced by one field rule.
///
/// `None` (or an empty list) means "not found" and never clears a value
/// already on the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPatch {
    pub org_number: Option<String>,
    pub revenue: Option<i64>,
    pub legal_name: Option<String>,
    pub registration_date: Option<String>,
    pub company_type: Option<String>,
    pub employees: Option<String>,
    pub ceo: Option<String>,
    pub address: Option<String>,
    pub postal_address: Option<String>,
    pub share_capital: Option<String>,
    pub sni_codes: Vec<String>,
    pub business_purpose: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    /// Appended to the record's emails, duplicates included.
    pub emails: Vec<String>,
}

impl FieldPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == FieldPatch::default()
    }

    /// Writes every present field onto `record`, replacing earlier values.
    pub fn apply_to(self, record: &mut EntityRecord) {
        fn set<T>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut record.org_number, self.org_number);
        set(&mut record.revenue, self.revenue);
        set(&mut record.legal_name, self.legal_name);
        set(&mut record.registration_date, self.registration_date);
        set(&mut record.company_type, self.company_type);
        set(&mut record.employees, self.employees);
        set(&mut record.ceo, self.ceo);
        set(&mut record.address, self.address);
        if let Some(postal_address) = self.postal_address {
            record.set_postal_address(postal_address);
        }
        set(&mut record.share_capital, self.share_capital);
        if !self.sni_codes.is_empty() {
            record.sni_codes = self.sni_codes;
        }
        set(&mut record.business_purpose, self.business_purpose);
        set(&mut record.phone, self.phone);
        set(&mut record.website, self.website);
        record.emails.extend(self.emails);
    }
}
