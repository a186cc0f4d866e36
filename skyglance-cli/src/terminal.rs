//! Terminal rendering of the weather card.

use skyglance_core::{RenderTarget, Slot};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct TerminalCard {
    texts: BTreeMap<Slot, String>,
    icon: Option<(String, String)>,
}

impl TerminalCard {
    fn get(&self, slot: Slot) -> &str {
        self.texts.get(&slot).map(String::as_str).unwrap_or("--")
    }

    pub fn has_weather(&self) -> bool {
        self.texts.contains_key(&Slot::Location)
    }

    /// Multi-line card, one row per reading.
    pub fn card(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("{}\n", self.get(Slot::Location)));
        if self.texts.contains_key(&Slot::Clock) {
            out.push_str(&format!("{}  {}\n", self.get(Slot::Date), self.get(Slot::Clock)));
        }
        out.push('\n');
        out.push_str(&format!(
            "  {}  {}\n",
            self.get(Slot::CurrentTemperature),
            self.get(Slot::Condition)
        ));
        out.push_str(&format!("  {}\n", self.get(Slot::FeelsLike)));
        out.push_str(&format!("  {}\n\n", self.get(Slot::TempRange)));

        let rows = [
            ("Humidity", format!("{} ({})", self.get(Slot::Humidity), self.get(Slot::HumidityStatus))),
            ("Wind", format!("{} m/s", self.get(Slot::Wind))),
            (
                "Visibility",
                format!("{} ({})", self.get(Slot::Visibility), self.get(Slot::VisibilityStatus)),
            ),
            ("UV index", format!("{} ({})", self.get(Slot::UvIndex), self.get(Slot::UvStatus))),
            ("Sunrise", self.get(Slot::Sunrise).to_string()),
            ("Sunset", self.get(Slot::Sunset).to_string()),
        ];
        for (label, value) in rows {
            out.push_str(&format!("  {label:<11} {value}\n"));
        }

        if let Some((url, alt)) = &self.icon {
            out.push_str(&format!("  {:<11} {} <{}>\n", "Icon", alt, url));
        }

        out
    }
}

impl RenderTarget for TerminalCard {
    fn set_text(&mut self, slot: Slot, text: &str) {
        self.texts.insert(slot, text.to_string());
    }

    fn set_image(&mut self, _slot: Slot, url: &str, alt: &str) {
        self.icon = Some((url.to_string(), alt.to_string()));
    }

    fn alert(&mut self, message: &str) {
        eprintln!("{message}");
    }
}
