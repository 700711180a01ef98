//! Label/value row scanning and the ordered label rule table.

use std::collections::HashMap;
use std::sync::LazyLock;

use mcscout_core::CarrierRecord;
use scraper::{ElementRef, Html, Selector};

use super::text::{clean_phone, first_digit_run};

static ROW_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("valid row selector"));
static TH_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th").expect("valid th selector"));
static TD_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td").expect("valid td selector"));
static CELL_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("th, td").expect("valid cell selector"));

/// One `<th>` label paired with the first `<td>` that follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LabelValue {
    /// Lowercased, stripped label text.
    pub label: String,
    /// Value cell text fragments, stripped and concatenated.
    pub value: String,
    /// Value cell text fragments, stripped, one per line.
    pub lines: Vec<String>,
}

/// Field a snapshot label maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    LegalName,
    EntityType,
    AlternateIdentifier,
    PhysicalAddress,
    Phone,
    OutOfServiceDate,
    OperatingStatus,
    OperatingAuthority,
}

struct LabelRule {
    needles: &'static [&'static str],
    field: Field,
}

/// Evaluated top to bottom; the first rule with a needle contained in the
/// label wins.
const PRIMARY_RULES: &[LabelRule] = &[
    LabelRule {
        needles: &["legal name"],
        field: Field::LegalName,
    },
    LabelRule {
        needles: &["entity type"],
        field: Field::EntityType,
    },
    LabelRule {
        needles: &["usdot number"],
        field: Field::AlternateIdentifier,
    },
    LabelRule {
        needles: &["physical address"],
        field: Field::PhysicalAddress,
    },
    LabelRule {
        needles: &["phone"],
        field: Field::Phone,
    },
    LabelRule {
        needles: &["out of service date"],
        field: Field::OutOfServiceDate,
    },
    LabelRule {
        needles: &["operating status", "carrier status", "usdot status"],
        field: Field::OperatingStatus,
    },
    LabelRule {
        needles: &["operating authority"],
        field: Field::OperatingAuthority,
    },
];

/// Maps a lowercased label to its field using [`PRIMARY_RULES`].
pub(crate) fn match_label(label: &str) -> Option<Field> {
    PRIMARY_RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|n| label.contains(n)))
        .map(|rule| rule.field)
}

/// Collects label/value pairs from every row holding both header and data
/// cells, in document order.
pub(crate) fn label_value_pairs(document: &Html) -> Vec<LabelValue> {
    let cells: Vec<ElementRef<'_>> = document.select(&CELL_SEL).collect();
    let position: HashMap<_, usize> = cells
        .iter()
        .enumerate()
        .map(|(idx, cell)| (cell.id(), idx))
        .collect();

    let mut pairs = Vec::new();
    for row in document.select(&ROW_SEL) {
        if row.select(&TD_SEL).next().is_none() {
            continue;
        }
        for th in row.select(&TH_SEL) {
            let Some(&idx) = position.get(&th.id()) else {
                continue;
            };
            let Some(td) = cells[idx + 1..]
                .iter()
                .find(|cell| cell.value().name() == "td")
            else {
                continue;
            };
            let lines = stripped_fragments(*td);
            pairs.push(LabelValue {
                label: stripped_fragments(th).concat().to_lowercase(),
                value: lines.concat(),
                lines,
            });
        }
    }
    pairs
}

fn stripped_fragments(element: ElementRef<'_>) -> Vec<String> {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Writes `pair` into `record` for `field`, keeping any value already set.
pub(crate) fn assign(record: &mut CarrierRecord, field: Field, pair: &LabelValue) {
    let slot = match field {
        Field::LegalName => &mut record.legal_name,
        Field::EntityType => &mut record.entity_type,
        Field::AlternateIdentifier => &mut record.alternate_identifier,
        Field::PhysicalAddress => &mut record.physical_address,
        Field::Phone => &mut record.phone_number,
        Field::OutOfServiceDate => &mut record.out_of_service_date,
        Field::OperatingStatus => &mut record.operating_status,
        Field::OperatingAuthority => &mut record.operating_authority_status,
    };
    if !slot.trim().is_empty() {
        return;
    }

    let value = match field {
        Field::AlternateIdentifier => first_digit_run(&pair.value).map(str::to_owned),
        Field::PhysicalAddress => Some(pair.lines.join(" ")),
        Field::Phone => clean_phone(&pair.value),
        _ => Some(pair.value.clone()),
    };
    if let Some(value) = value {
        *slot = value;
    }
}
