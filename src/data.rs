use serde::{Deserialize, Serialize};

pub const APP_ID: &str = "io.github.pharmorigin.Explorer";
pub const PRODUCT_NAME: &str = "PharmOrigin Explorer";

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const WORLD_GEOJSON_URL: &str =
    "https://raw.githubusercontent.com/holtzy/D3-graph-gallery/master/DATA/world.geojson";

/// Storage key holding the recent-search list.
pub const HISTORY_KEY: &str = "pharm_origin_history";
/// Query parameter carrying the shared medicine name.
pub const SHARE_PARAM: &str = "drug";

pub const LOOKUP_ERROR_MESSAGE: &str = "Information for this compound is currently unavailable. \
    Please check the spelling or try a more common name.";

/// Attributed origin of one medicine, as returned by the lookup service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineOrigin {
    pub name: String,
    pub country: String,
    /// ISO 3166-1 alpha-3, compared against map feature ids.
    pub country_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// Free text so ranges like "1920s" survive.
    pub discovery_year: String,
    pub discoverer: String,
    pub brief_history: String,
    pub coordinates: Coordinates,
    pub classification: String,
    pub fun_fact: String,
}

impl MedicineOrigin {
    /// "Country, City" when a city is known.
    pub fn birthplace(&self) -> String {
        match self.city.as_deref().map(str::trim) {
            Some(city) if !city.is_empty() => format!("{}, {}", self.country, city),
            _ => self.country.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn is_plausible(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Curated names offered as suggestions, sorted case-insensitively.
pub const MEDICINE_NAMES: &[&str] = &[
    "Adalimumab",
    "Albuterol",
    "Amlodipine",
    "Amoxicillin",
    "Aspirin",
    "Atorvastatin",
    "Azithromycin",
    "Ciprofloxacin",
    "Clopidogrel",
    "Cyclosporine",
    "Diazepam",
    "Digoxin",
    "Doxycycline",
    "Duloxetine",
    "Escitalopram",
    "Fluoxetine",
    "Furosemide",
    "Gabapentin",
    "Hydrochlorothiazide",
    "Ibuprofen",
    "Infliximab",
    "Insulin",
    "Levothyroxine",
    "Lisinopril",
    "Lorezepam",
    "Losartan",
    "Meloxicam",
    "Metformin",
    "Metoprolol",
    "Montelukast",
    "Morphine",
    "Omeprazole",
    "Oxycodone",
    "Pantoprazole",
    "Paracetamol",
    "Penicillin",
    "Prednisone",
    "Quinine",
    "Ranitidine",
    "Rituximab",
    "Rosuvastatin",
    "Sertraline",
    "Simvastatin",
    "Streptomycin",
    "Tacrolimus",
    "Tramadol",
    "Valsartan",
    "Venlafaxine",
    "Warfarin",
    "Zolpidem",
];

#[derive(Debug, Clone, Copy)]
pub struct Category {
    pub title: &'static str,
    pub icon_name: &'static str,
    pub css_class: &'static str,
    pub items: &'static [&'static str],
}

pub const CATEGORIES: &[Category] = &[
    Category {
        title: "Antibiotics",
        icon_name: "security-high-symbolic",
        css_class: "category-antibiotics",
        items: &["Penicillin", "Streptomycin", "Amoxicillin"],
    },
    Category {
        title: "Hormones",
        icon_name: "emblem-system-symbolic",
        css_class: "category-hormones",
        items: &["Insulin", "Thyroxine", "Oxytocin"],
    },
    Category {
        title: "Analgesics",
        icon_name: "weather-storm-symbolic",
        css_class: "category-analgesics",
        items: &["Aspirin", "Morphine", "Ibuprofen"],
    },
    Category {
        title: "Modern Biologics",
        icon_name: "system-search-symbolic",
        css_class: "category-biologics",
        items: &["Metformin", "Statins", "Quinine"],
    },
];

#[cfg(test)]
pub(crate) fn sample_origin(name: &str) -> MedicineOrigin {
    MedicineOrigin {
        name: name.to_string(),
        country: "United Kingdom".to_string(),
        country_code: "GBR".to_string(),
        city: Some("London".to_string()),
        discovery_year: "1928".to_string(),
        discoverer: "Alexander Fleming".to_string(),
        brief_history: "Mould on a petri dish.".to_string(),
        coordinates: Coordinates { lat: 51.5, lng: -0.12 },
        classification: "Antibiotic".to_string(),
        fun_fact: "It was an accident.".to_string(),
    }
}
