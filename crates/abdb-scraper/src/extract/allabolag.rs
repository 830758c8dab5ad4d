//! Field extraction for allabolag.se listing and profile pages.

use std::sync::LazyLock;

use abdb_core::EntityReference;
use scraper::{ElementRef, Html, Selector};

use super::{parse_integer, FieldPatch, FieldRule, PageFieldExtractor};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid css selector")
}

static RESULT_CARD: LazyLock<Selector> =
    LazyLock::new(|| selector("div.SegmentationSearchResultCard-card"));
static CARD_LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));

static ACCOUNTING_ROW: LazyLock<Selector> =
    LazyLock::new(|| selector("table.AccountFiguresWidget-accountingtable tr"));
static TH: LazyLock<Selector> = LazyLock::new(|| selector("th"));
static TD: LazyLock<Selector> = LazyLock::new(|| selector("td"));

static OFFICIAL_PROPERTY_LIST: LazyLock<Selector> =
    LazyLock::new(|| selector("span.OfficialCompanyInformationCard-propertyList"));
static OFFICIAL_PROPERTY: LazyLock<Selector> =
    LazyLock::new(|| selector("span.OfficialCompanyInformationCard-property"));
static OFFICIAL_VALUE: LazyLock<Selector> =
    LazyLock::new(|| selector("span.OfficialCompanyInformationCard-propertyValue"));
static INDUSTRY_LINK: LazyLock<Selector> = LazyLock::new(|| {
    selector("span.OfficialCompanyInformationCard-propertyValue a[href*='naceIndustry']")
});

static CONTACT_PROPERTY_LIST: LazyLock<Selector> =
    LazyLock::new(|| selector("span.ContactInformationCard-smallPropertyList"));
static CONTACT_PROPERTY: LazyLock<Selector> =
    LazyLock::new(|| selector("span.ContactInformationCard-smallProperty"));
static CONTACT_VALUE: LazyLock<Selector> =
    LazyLock::new(|| selector("span.ContactInformationCard-smallPropertyValue"));
static LINK: LazyLock<Selector> = LazyLock::new(|| selector("a[href]"));
static BUTTON: LazyLock<Selector> = LazyLock::new(|| selector("button"));

static BUSINESS_PURPOSE: LazyLock<Selector> = LazyLock::new(|| {
    selector(
        "div.MuiGrid-root.MuiGrid-direction-xs-row.MuiGrid-grid-xs-12\
         .MuiTypography-root.MuiTypography-body2.mui-18twy0e",
    )
});

/// [`PageFieldExtractor`] for the allabolag.se markup.
#[derive(Debug, Clone)]
pub struct AllabolagExtractor {
    base_url: String,
}

impl AllabolagExtractor {
    /// `base_url` is the site root that relative profile links are joined to.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    fn absolute_url(&self, href: &str) -> String {
        if href.starts_with("http://") || href.starts_with("https://") {
            href.to_owned()
        } else if href.starts_with('/') {
            format!("{}{href}", self.base_url)
        } else {
            format!("{}/{href}", self.base_url)
        }
    }
}

impl PageFieldExtractor for AllabolagExtractor {
    fn extract_references(&self, page: &str) -> Vec<EntityReference> {
        let document = Html::parse_document(page);
        document
            .select(&RESULT_CARD)
            .filter_map(|card| {
                let link = card.select(&CARD_LINK).next()?;
                let href = link.value().attr("href")?.trim();
                if href.is_empty() {
                    return None;
                }
                Some(EntityReference::new(
                    element_text(link),
                    self.absolute_url(href),
                ))
            })
            .collect()
    }

    fn extract_fields(&self, page: &str, rule: FieldRule) -> FieldPatch {
        let document = Html::parse_document(page);
        match rule {
            FieldRule::AccountingTable => accounting_table(&document),
            FieldRule::OfficialInfo => official_info(&document),
            FieldRule::ContactLabels => contact_labels(&document),
            FieldRule::IndustryCodes => industry_codes(&document),
            FieldRule::ContactInfo => contact_info(&document),
            FieldRule::BusinessPurpose => business_purpose(&document),
        }
    }
}

/// Revenue from the first "Omsättning" row of the accounting table.
fn accounting_table(document: &Html) -> FieldPatch {
    let mut patch = FieldPatch::default();
    let revenue_row = document.select(&ACCOUNTING_ROW).find(|row| {
        row.select(&TH)
            .next()
            .is_some_and(|th| element_text(th).contains("Omsättning"))
    });
    if let Some(row) = revenue_row {
        patch.revenue = row
            .select(&TD)
            .next()
            .and_then(|td| parse_integer(&element_text(td)));
    }
    patch
}

fn official_info(document: &Html) -> FieldPatch {
    let mut patch = FieldPatch::default();
    let pairs = labeled_pairs(
        document,
        &OFFICIAL_PROPERTY_LIST,
        &OFFICIAL_PROPERTY,
        &OFFICIAL_VALUE,
    );
    for (key, value) in pairs {
        let text = non_empty(element_text(value));
        if key.contains("juridiskt namn") {
            patch.legal_name = text;
        } else if key.contains("organisationsnummer") {
            patch.org_number = text;
        } else if key.contains("registreringsdatum") {
            patch.registration_date = text;
        } else if key.contains("bolagsform") {
            patch.company_type = text;
        } else if key.contains("antal anställda") {
            patch.employees = text;
        } else if key.contains("aktiekapital") {
            patch.share_capital = text;
        } else if key.contains("adress") && !key.contains("post") {
            patch.address = text;
        } else if key.contains("postadress") {
            patch.postal_address = text;
        } else if key.contains("verkställande direktör") {
            patch.ceo = text;
        }
    }
    patch
}

/// Contact card read as plain label/value text.
fn contact_labels(document: &Html) -> FieldPatch {
    let mut patch = FieldPatch::default();
    let pairs = labeled_pairs(
        document,
        &CONTACT_PROPERTY_LIST,
        &CONTACT_PROPERTY,
        &CONTACT_VALUE,
    );
    for (key, value) in pairs {
        if key.contains("e-post") {
            patch.emails.extend(non_empty(element_text(value)));
        } else if key.contains("hemsida") {
            patch.website = non_empty(element_text(value));
        }
    }
    patch
}

fn industry_codes(document: &Html) -> FieldPatch {
    FieldPatch {
        sni_codes: document
            .select(&INDUSTRY_LINK)
            .filter_map(|link| non_empty(element_text(link)))
            .collect(),
        ..FieldPatch::default()
    }
}

/// Contact card read through its links and buttons.
fn contact_info(document: &Html) -> FieldPatch {
    let mut patch = FieldPatch::default();
    let pairs = labeled_pairs(
        document,
        &CONTACT_PROPERTY_LIST,
        &CONTACT_PROPERTY,
        &CONTACT_VALUE,
    );
    for (key, value) in pairs {
        if key.contains("telefon") {
            patch.phone = non_empty(element_text(value));
        } else if key.contains("hemsida") {
            let href = value
                .select(&LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(|href| href.trim().to_owned());
            if let Some(href) = href.and_then(non_empty) {
                patch.website = Some(href);
            }
        } else if key.contains("e-post") {
            if let Some(button) = value.select(&BUTTON).next() {
                patch.emails.extend(non_empty(element_text(button)));
            }
        } else if key.contains("adress") && !key.contains("post") {
            patch.address = non_empty(element_text(value));
        } else if key.contains("postadress") {
            patch.postal_address = non_empty(element_text(value));
        }
    }
    patch
}

fn business_purpose(document: &Html) -> FieldPatch {
    let purpose = document.select(&BUSINESS_PURPOSE).next().and_then(|block| {
        let words: Vec<&str> = block
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        non_empty(words.join(" "))
    });
    FieldPatch {
        business_purpose: purpose,
        ..FieldPatch::default()
    }
}

/// `(lowercased label, value element)` pairs from a label/value property list.
fn labeled_pairs<'a>(
    document: &'a Html,
    list: &'a Selector,
    label: &'a Selector,
    value: &'a Selector,
) -> impl Iterator<Item = (String, ElementRef<'a>)> + 'a {
    document.select(list).filter_map(move |item| {
        let key = element_text(item.select(label).next()?).to_lowercase();
        let value = item.select(value).next()?;
        Some((key, value))
    })
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_owned()
}

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
#[path = "allabolag_test.rs"]
mod tests;
