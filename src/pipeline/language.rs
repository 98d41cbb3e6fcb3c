//! Supported response languages and the localized fallback messages
//! shown when the model's reply cannot be used as-is.

/// Locale codes accepted from clients, with the name used in prompts.
const LANGUAGES: &[(&str, &str)] = &[
    ("en-IN", "English"),
    ("hi-IN", "Hindi"),
    ("pa-IN", "Punjabi"),
    ("bn-IN", "Bengali"),
    ("te-IN", "Telugu"),
    ("mr-IN", "Marathi"),
    ("ta-IN", "Tamil"),
    ("ur-IN", "Urdu"),
    ("gu-IN", "Gujarati"),
    ("kn-IN", "Kannada"),
    ("ml-IN", "Malayalam"),
    ("or-IN", "Odia"),
    ("as-IN", "Assamese"),
    ("mai-IN", "Maithili"),
    ("sat-IN", "Santali"),
    ("ks-IN", "Kashmiri"),
    ("ne-IN", "Nepali"),
    ("kok-IN", "Konkani"),
    ("sd-IN", "Sindhi"),
    ("doi-IN", "Dogri"),
    ("mni-IN", "Manipuri"),
    ("brx-IN", "Bodo"),
    ("sa-IN", "Sanskrit"),
    ("bh-IN", "Bhojpuri"),
];

pub const DEFAULT_LANGUAGE_CODE: &str = "en-IN";

/// A resolved response language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub code: &'static str,
    pub name: &'static str,
}

impl Language {
    /// Resolve a client-supplied locale code. Unknown codes fall back to English.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim();
        LANGUAGES
            .iter()
            .find(|(c, _)| c.eq_ignore_ascii_case(code))
            .map(|&(code, name)| Language { code, name })
            .unwrap_or_else(Self::english)
    }

    pub fn english() -> Self {
        Language {
            code: DEFAULT_LANGUAGE_CODE,
            name: "English",
        }
    }

    pub fn is_supported(code: &str) -> bool {
        LANGUAGES.iter().any(|(c, _)| c.eq_ignore_ascii_case(code.trim()))
    }

    /// Localized text for a fallback situation.
    pub fn fallback(self, message: Fallback) -> &'static str {
        match self.code {
            "hi-IN" => message.hindi(),
            _ => message.english(),
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::english()
    }
}

/// Situations where user-facing text is substituted for model output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// The triage reply had no usable `responseText`.
    TriageResponse,
    /// The model produced nothing (blocked or empty candidates).
    NoAnswer,
    /// The model or the network call failed.
    TechnicalProblem,
    /// The analysis reply had no usable `originalText`.
    OriginalText,
    /// The analysis reply had no usable `simplifiedText`.
    SimplifiedText,
}

impl Fallback {
    fn english(self) -> &'static str {
        match self {
            Fallback::TriageResponse => {
                "I am trying to understand your symptoms. Please see a nearby doctor \
                 for a proper check-up and advice."
            }
            Fallback::NoAnswer => {
                "I could not prepare an answer right now. Please describe your symptoms \
                 a little differently and try again, or contact a nearby doctor."
            }
            Fallback::TechnicalProblem => {
                "The system is facing a technical problem at the moment. Please try again \
                 after some time or contact a nearby doctor directly."
            }
            Fallback::OriginalText => "The text of this document could not be read clearly.",
            Fallback::SimplifiedText => {
                "A simple explanation of this document is not available right now. \
                 Please ask your doctor or pharmacist to explain it."
            }
        }
    }

    fn hindi(self) -> &'static str {
        match self {
            Fallback::TriageResponse => {
                "मैं आपके लक्षणों को समझने की कोशिश कर रहा हूँ। कृपया नज़दीकी डॉक्टर से सही जाँच और सलाह के लिए मिलें।"
            }
            Fallback::NoAnswer => {
                "इस समय मैं आपके लिए उत्तर तैयार नहीं कर पाया। कृपया अपने लक्षणों को थोड़ा अलग तरीके से लिखकर दोबारा कोशिश करें या नज़दीकी डॉक्टर से संपर्क करें।"
            }
            Fallback::TechnicalProblem => {
                "इस समय सिस्टम में तकनीकी समस्या आ रही है। कृपया कुछ देर बाद दोबारा प्रयास करें या सीधे नज़दीकी डॉक्टर से संपर्क करें।"
            }
            Fallback::OriginalText => "इस दस्तावेज़ का पाठ साफ़ तौर पर पढ़ा नहीं जा सका।",
            Fallback::SimplifiedText => {
                "इस दस्तावेज़ की सरल व्याख्या अभी उपलब्ध नहीं है। कृपया अपने डॉक्टर या फार्मासिस्ट से इसे समझने में मदद लें।"
            }
        }
    }
}
