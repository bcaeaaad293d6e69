//! Coarse heart-rate classification and teaching text

use serde::{Deserialize, Serialize};

/// Below this mean rate (bpm) a trace counts as bradycardic
pub const BRADYCARDIA_BELOW: f64 = 60.0;
/// Above this mean rate (bpm) a trace counts as tachycardic
pub const TACHYCARDIA_ABOVE: f64 = 100.0;

/// Resting heart-rate category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HrClass {
    Bradycardia,
    Normal,
    Tachycardia,
}

impl HrClass {
    /// Canned explanation of the category
    pub fn description(&self) -> &'static str {
        match self {
            HrClass::Bradycardia => {
                "HR below 60 bpm often appears in endurance athletes or during sleep, \
                 but can also signal conduction issues."
            }
            HrClass::Normal => {
                "HR between 60 and 100 bpm is considered a normal sinus rhythm at rest \
                 for most adults."
            }
            HrClass::Tachycardia => {
                "HR above 100 bpm may reflect exercise, stress, fever, or arrhythmias \
                 depending on context."
            }
        }
    }
}

impl std::fmt::Display for HrClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HrClass::Bradycardia => write!(f, "Bradycardia"),
            HrClass::Normal => write!(f, "Normal"),
            HrClass::Tachycardia => write!(f, "Tachycardia"),
        }
    }
}

/// Classify a mean heart rate; 60 and 100 bpm themselves are normal
pub fn classify_hr(mean_hr: f64) -> HrClass {
    if mean_hr < BRADYCARDIA_BELOW {
        HrClass::Bradycardia
    } else if mean_hr <= TACHYCARDIA_ABOVE {
        HrClass::Normal
    } else {
        HrClass::Tachycardia
    }
}

/// Short educational explanation of the reported rate
pub fn summary_text(mean_hr: f64, class: HrClass) -> String {
    match class {
        HrClass::Bradycardia => format!(
            "HR ≈ {:.0} bpm falls in the bradycardia range. This can be normal in well-trained \
             athletes or during rest, but persistent low HR with symptoms warrants clinical attention.",
            mean_hr
        ),
        HrClass::Normal => format!(
            "HR ≈ {:.0} bpm is within the expected resting range (60-100 bpm). Factors such as \
             hydration, breathing, or mild stress can still nudge values slightly up or down.",
            mean_hr
        ),
        HrClass::Tachycardia => format!(
            "HR ≈ {:.0} bpm indicates tachycardia. Exercise and stress are common causes, yet \
             clinicians also evaluate fever, medications, or arrhythmias before acting.",
            mean_hr
        ),
    }
}

/// Reminder that the model is a teaching toy
pub fn educational_disclaimer() -> &'static str {
    "Educational demo only - not diagnostic. Real ECG interpretation considers morphology, \
     symptoms, and patient history."
}
