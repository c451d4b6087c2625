//! Sidebar filter configurations per category.
//!
//! These describe which filters a category page offers and how they are
//! rendered. Every key here is also a filter key the asset field map
//! understands, so a value picked in the sidebar always reaches the engine.

use serde::Serialize;

/// Widget used to pick a filter value.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FilterControl {
    Select,
    Checkbox,
    Range,
    Badge,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FilterOption {
    pub value: &'static str,
    pub label: &'static str,
}

/// One sidebar filter.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct FilterConfig {
    pub key: &'static str,
    #[serde(rename = "type")]
    pub control: FilterControl,
    pub label: &'static str,
    #[serde(skip_serializing_if = "no_options")]
    pub options: &'static [FilterOption],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_label: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_label: Option<&'static str>,
}

fn no_options(options: &&'static [FilterOption]) -> bool {
    options.is_empty()
}

const fn opt(value: &'static str, label: &'static str) -> FilterOption {
    FilterOption { value, label }
}

const fn checkbox(key: &'static str, label: &'static str, options: &'static [FilterOption]) -> FilterConfig {
    FilterConfig {
        key,
        control: FilterControl::Checkbox,
        label,
        options,
        prefix: None,
        from_label: None,
        to_label: None,
    }
}

const fn select(key: &'static str, label: &'static str, options: &'static [FilterOption]) -> FilterConfig {
    FilterConfig {
        control: FilterControl::Select,
        ..checkbox(key, label, options)
    }
}

const fn range(key: &'static str, label: &'static str, prefix: Option<&'static str>) -> FilterConfig {
    FilterConfig {
        key,
        control: FilterControl::Range,
        label,
        options: &[],
        prefix,
        from_label: Some("Desde"),
        to_label: Some("Hasta"),
    }
}

const BILLING_TYPE: FilterConfig = checkbox(
    "billing_type",
    "Opción de Compra",
    &[opt("fixed_price", "Comprar Ahora"), opt("auction", "Subasta")],
);

const PRICE: FilterConfig = range("price", "Precio", Some("$"));

pub const CARD_FILTERS: &[FilterConfig] = &[
    checkbox(
        "subcategory",
        "Subcategoría",
        &[
            opt("Baseball", "Baseball"),
            opt("Basketball", "Basketball"),
            opt("Football", "Football"),
            opt("Hockey", "Hockey"),
            opt("Pokémon (English)", "Pokémon (Inglés)"),
            opt("Pokémon (Japanese)", "Pokémon (Japonés)"),
            opt("Pokémon (Other Languages)", "Pokémon (Otros Idiomas)"),
            opt("Other", "Otro"),
        ],
    ),
    checkbox(
        "card_type",
        "Tipo de Carta",
        &[
            opt("Holo", "Holo"),
            opt("1st Edition", "1ra Edición"),
            opt("Shadowless", "Shadowless"),
            opt("Promo", "Promo"),
            opt("Reverse Holo", "Reverse Holo"),
        ],
    ),
    range("year", "Año", None),
    range("grade", "Grado (1-10)", None),
    select(
        "authenticator",
        "Autenticador",
        &[
            opt("", "Todos"),
            opt("PSA", "PSA"),
            opt("BGS", "BGS/Beckett"),
            opt("CGC", "CGC"),
            opt("SGC", "SGC"),
            opt("N/A", "No Autenticado"),
        ],
    ),
    BILLING_TYPE,
    PRICE,
];

pub const COIN_FILTERS: &[FilterConfig] = &[
    range("year", "Año", None),
    range("grade", "Grado (1-70)", None),
    select(
        "authenticator",
        "Autenticador",
        &[
            opt("", "Todos"),
            opt("PCGS", "PCGS"),
            opt("NGC", "NGC"),
            opt("ANACS", "ANACS"),
            opt("ICG", "ICG"),
            opt("N/A", "No Autenticado"),
        ],
    ),
    checkbox(
        "metal",
        "Metal",
        &[
            opt("Gold", "Oro"),
            opt("Silver", "Plata"),
            opt("Copper", "Cobre"),
            opt("Platinum", "Platino"),
            opt("Bronze", "Bronce"),
        ],
    ),
    BILLING_TYPE,
    PRICE,
    checkbox(
        "country",
        "País",
        &[
            opt("United States", "Estados Unidos"),
            opt("Great Britain", "Gran Bretaña"),
            opt("France", "Francia"),
            opt("Germany", "Alemania"),
            opt("Roman Empire", "Imperio Romano"),
            opt("Spain", "España"),
            opt("Mexico", "México"),
        ],
    ),
];

/// Generic filters for categories without a dedicated sidebar.
pub const DEFAULT_FILTERS: &[FilterConfig] = &[BILLING_TYPE, PRICE];

/// Filters offered on a category page, by canonical slug.
pub fn for_category(slug: &str) -> &'static [FilterConfig] {
    match slug {
        "cartas" => CARD_FILTERS,
        "numismatica" => COIN_FILTERS,
        _ => DEFAULT_FILTERS,
    }
}
