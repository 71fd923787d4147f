// src/extract/mod.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace, warn};
use url::Url;

use crate::config::InvalidCountPolicy;
use crate::error::{ExtractError, Result};
use crate::fetch::RawDocument;
use crate::record::{BedRecord, Period};
use crate::uf::Uf;

pub mod utils;

use utils::{clean_text, parse_count};

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static CSS selector should parse")
}

/// The registry's content table, on both the index and the bed table pages.
static CONTENT_TABLE: Lazy<Selector> =
    Lazy::new(|| selector(r#"table[border="1"][align="center"]"#));
static LINK: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static BANNER: Lazy<Selector> =
    Lazy::new(|| selector(r##"font[color="#ffcc99"][face="verdana,arial"][size="1"]"##));
static DATA_ROW: Lazy<Selector> = Lazy::new(|| selector(r##"tr[bgcolor="#cccccc"]"##));
static CELL: Lazy<Selector> = Lazy::new(|| selector("td"));

/// Cells a data row needs: CNES, name, municipality, existing, SUS.
const REQUIRED_CELLS: usize = 5;

/// Bed type and specialty as stated in a table page's banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedClassification {
    pub bed_type: String,
    pub specialty: String,
}

/// Links to every bed table listed on a state's index page, in page order.
pub fn extract_table_links(doc: &RawDocument) -> Result<Vec<Url>> {
    let html = Html::parse_document(doc.body());
    let table = content_table(&html, doc)?;

    let mut links: Vec<Url> = Vec::new();
    for el in table.select(&LINK) {
        let Some(href) = el.value().attr("href") else {
            continue;
        };
        match doc.url().join(href.trim()) {
            Ok(full) if matches!(full.scheme(), "http" | "https" | "file") => {
                trace!(url = %full, "Found bed table link");
                if !links.contains(&full) {
                    links.push(full);
                }
            }
            Ok(_) => trace!(href, "Ignoring non-document link"),
            Err(e) => warn!(href, error = %e, "Ignoring unresolvable link"),
        }
    }

    if links.is_empty() {
        return Err(ExtractError::incomplete_page(
            doc.url(),
            "bed table index lists no links",
        ));
    }
    debug!(count = links.len(), source = %doc.url(), "extracted table links");
    Ok(links)
}

/// Read the classification banner: `<prefix> - <type> - ... - <specialty>`.
pub fn extract_classification(html: &Html, source: &Url) -> Result<BedClassification> {
    let banner: String = html
        .select(&BANNER)
        .nth(1)
        .map(|el| el.text().collect())
        .ok_or_else(|| {
            ExtractError::incomplete_page(source, "bed classification banner not found")
        })?;

    let segments: Vec<String> = banner
        .split(" - ")
        .map(clean_text)
        .filter(|s| !s.is_empty())
        .collect();
    if segments.len() < 2 {
        return Err(ExtractError::parse(
            source,
            format!("cannot split bed classification `{}`", clean_text(&banner)),
        ));
    }

    Ok(BedClassification {
        bed_type: segments[1].to_uppercase(),
        specialty: segments[segments.len() - 1].to_uppercase(),
    })
}

/// Every facility row of one bed table page, in page order.
///
/// Rows with an empty CNES code are skipped. Invalid bed counts follow
/// `policy`: the row is dropped (`Skip`) or the count becomes 0 (`Zero`).
pub fn extract_bed_table(
    doc: &RawDocument,
    uf: Uf,
    period: Period,
    policy: InvalidCountPolicy,
) -> Result<Vec<BedRecord>> {
    let html = Html::parse_document(doc.body());
    let class = extract_classification(&html, doc.url())?;
    let table = content_table(&html, doc)?;

    let mut records = Vec::new();
    for (idx, row) in table.select(&DATA_ROW).enumerate() {
        let cells: Vec<String> = row
            .select(&CELL)
            .map(|td| clean_text(&td.text().collect::<String>()))
            .collect();
        if cells.len() < REQUIRED_CELLS {
            return Err(ExtractError::parse(
                doc.url(),
                format!(
                    "row {} has {} cells, expected at least {}",
                    idx + 1,
                    cells.len(),
                    REQUIRED_CELLS
                ),
            ));
        }

        let cnes = &cells[0];
        if cnes.is_empty() {
            warn!(row = idx + 1, source = %doc.url(), "skipping row without CNES code");
            continue;
        }

        let Some(existing) = count_cell(&cells[3], "existing", cnes, policy) else {
            continue;
        };
        let Some(sus) = count_cell(&cells[4], "sus", cnes, policy) else {
            continue;
        };
        if sus > existing {
            debug!(cnes = %cnes, existing, sus, "more SUS beds than existing; non_sus set to 0");
        }

        records.push(BedRecord {
            cnes: cnes.clone(),
            facility_name: cells[1].clone(),
            uf: uf.acronym().to_string(),
            municipality: cells[2].clone(),
            bed_type: class.bed_type.clone(),
            specialty: class.specialty.clone(),
            existing,
            sus,
            non_sus: existing.saturating_sub(sus),
            period,
        });
    }

    debug!(
        rows = records.len(),
        bed_type = %class.bed_type,
        specialty = %class.specialty,
        "extracted bed table"
    );
    Ok(records)
}

fn content_table<'a>(html: &'a Html, doc: &RawDocument) -> Result<ElementRef<'a>> {
    html.select(&CONTENT_TABLE)
        .next()
        .ok_or_else(|| ExtractError::parse(doc.url(), "bed table not found"))
}

/// `None` means drop the row.
fn count_cell(raw: &str, column: &str, cnes: &str, policy: InvalidCountPolicy) -> Option<u32> {
    if let Some(n) = parse_count(raw) {
        return Some(n);
    }
    match policy {
        InvalidCountPolicy::Skip => {
            warn!(cnes, column, value = raw, "invalid bed count; row skipped");
            None
        }
        InvalidCountPolicy::Zero => {
            warn!(cnes, column, value = raw, "invalid bed count; set to 0");
            Some(0)
        }
    }
}
