//! Tenant personality configuration and the system-prompt compiler.
//!
//! `compile` is a pure function of the configuration, tenant name, and
//! retrieved context; the output feeds the completion provider as the system
//! prompt. Philosophy and values are explicit ordered pair lists so rendering
//! never depends on map iteration order.

use crate::models::personalities::Personality;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Friendly,
    Casual,
    Formal,
    Enthusiastic,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Friendly => "friendly",
            Tone::Casual => "casual",
            Tone::Formal => "formal",
            Tone::Enthusiastic => "enthusiastic",
        }
    }

    pub fn parse(value: &str) -> Option<Tone> {
        match value {
            "professional" => Some(Tone::Professional),
            "friendly" => Some(Tone::Friendly),
            "casual" => Some(Tone::Casual),
            "formal" => Some(Tone::Formal),
            "enthusiastic" => Some(Tone::Enthusiastic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    Concise,
    Detailed,
    Conversational,
    Technical,
    Inspirational,
    #[default]
    Balanced,
}

impl Style {
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::Concise => "concise",
            Style::Detailed => "detailed",
            Style::Conversational => "conversational",
            Style::Technical => "technical",
            Style::Inspirational => "inspirational",
            Style::Balanced => "balanced",
        }
    }

    pub fn parse(value: &str) -> Option<Style> {
        match value {
            "concise" => Some(Style::Concise),
            "detailed" => Some(Style::Detailed),
            "conversational" => Some(Style::Conversational),
            "technical" => Some(Style::Technical),
            "inspirational" => Some(Style::Inspirational),
            "balanced" => Some(Style::Balanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ResponseLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseLength::Short => "short",
            ResponseLength::Medium => "medium",
            ResponseLength::Long => "long",
        }
    }

    pub fn parse(value: &str) -> Option<ResponseLength> {
        match value {
            "short" => Some(ResponseLength::Short),
            "medium" => Some(ResponseLength::Medium),
            "long" => Some(ResponseLength::Long),
            _ => None,
        }
    }
}

/// Closed, validated personality configuration. This is the domain form; the
/// row in `personalities` stores the same data with enums as text and the
/// pair lists as jsonb arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityConfig {
    pub tone: Tone,
    pub style: Style,
    pub expertise: Vec<String>,
    pub philosophy: Vec<(String, String)>,
    pub values: Vec<(String, String)>,
    pub brand_voice: Option<String>,
    pub custom_prompt: Option<String>,
    pub response_length: ResponseLength,
    pub language: String,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        PersonalityConfig {
            tone: Tone::Professional,
            style: Style::Balanced,
            expertise: vec!["general".to_string()],
            philosophy: Vec::new(),
            values: Vec::new(),
            brand_voice: None,
            custom_prompt: None,
            response_length: ResponseLength::Medium,
            language: "en".to_string(),
        }
    }
}

impl PersonalityConfig {
    /// Build the typed form from a stored row. Unknown enum values degrade to
    /// the defaults instead of failing the request.
    pub fn from_row(row: &Personality) -> PersonalityConfig {
        PersonalityConfig {
            tone: Tone::parse(&row.tone).unwrap_or_default(),
            style: Style::parse(&row.style).unwrap_or_default(),
            expertise: row.expertise.clone(),
            philosophy: pairs_from_json(&row.philosophy),
            values: pairs_from_json(&row.core_values),
            brand_voice: row.brand_voice.clone().filter(|v| !v.is_empty()),
            custom_prompt: row.custom_prompt.clone().filter(|v| !v.is_empty()),
            response_length: ResponseLength::parse(&row.response_length).unwrap_or_default(),
            language: row.language.clone(),
        }
    }

    /// Render the system prompt. Pure: byte-identical output for identical
    /// inputs, no clock, no randomness.
    pub fn compile(&self, tenant_name: &str, context: &str) -> String {
        let mut prompt = String::with_capacity(1024);

        prompt.push_str(&format!(
            "You are Solveur, an AI business assistant for {tenant_name}.\n\n"
        ));

        prompt.push_str("PERSONALITY:\n");
        prompt.push_str(&format!("- Tone: {}\n", self.tone.as_str()));
        prompt.push_str(&format!("- Style: {}\n", self.style.as_str()));
        prompt.push_str(&format!("- Expertise: {}\n\n", self.expertise.join(", ")));

        prompt.push_str("PHILOSOPHICAL FOUNDATIONS:\n");
        for (key, value) in &self.philosophy {
            prompt.push_str(&format!("{key}: {value}\n"));
        }

        prompt.push_str("\nCORE VALUES:\n");
        for (key, value) in &self.values {
            prompt.push_str(&format!("{key}: {value}\n"));
        }

        prompt.push_str("\nBRAND VOICE:\n");
        match &self.brand_voice {
            Some(voice) => prompt.push_str(voice),
            None => prompt.push_str(&format!(
                "{tenant_name} is committed to excellence and customer satisfaction."
            )),
        }

        prompt.push_str("\n\nINSTRUCTIONS:\n");
        prompt.push_str("- Use the provided context to answer questions accurately and helpfully\n");
        prompt.push_str("- Maintain the specified tone and style in your responses\n");
        prompt.push_str(
            "- If the context doesn't contain relevant information, say so politely and offer to help in other ways\n",
        );
        prompt.push_str(&format!(
            "- Keep responses {} in length\n",
            self.response_length.as_str()
        ));
        prompt.push_str(&format!("- Respond in {}\n", self.language));

        if let Some(custom) = &self.custom_prompt {
            prompt.push_str(&format!("\nADDITIONAL INSTRUCTIONS: {custom}\n"));
        }

        prompt.push_str(&format!("\nContext: {context}"));
        prompt
    }
}

/// Serialize an ordered pair list to its jsonb storage form: an array of
/// two-element arrays.
pub fn pairs_to_json(pairs: &[(String, String)]) -> serde_json::Value {
    serde_json::Value::Array(
        pairs
            .iter()
            .map(|(key, value)| serde_json::json!([key, value]))
            .collect(),
    )
}

/// Inverse of [`pairs_to_json`]. Malformed entries are dropped.
pub fn pairs_from_json(value: &serde_json::Value) -> Vec<(String, String)> {
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            let pair = entry.as_array()?;
            match pair.as_slice() {
                [key, value] => Some((key.as_str()?.to_string(), value.as_str()?.to_string())),
                _ => None,
            }
        })
        .collect()
}

/// A named personality preset derived from an industry template.
#[derive(Debug, Clone)]
pub struct IndustryProfile {
    pub name: String,
    pub description: String,
    pub config: PersonalityConfig,
}

/// Industry-template catalog used at onboarding. Unknown industries get the
/// technology defaults. The template brand voice opens with "We are a"; it is
/// rewritten to open with the company name.
pub fn industry_profile(industry: &str, company_name: &str) -> IndustryProfile {
    let normalized = industry.to_lowercase();
    let (tone, style, expertise, philosophy, values, brand_voice): (
        Tone,
        Style,
        &[&str],
        &[(&str, &str)],
        &[(&str, &str)],
        &str,
    ) = match normalized.as_str() {
        "healthcare" => (
            Tone::Professional,
            Style::Detailed,
            &["technical", "customer-support", "strategic"],
            &[
                ("patientFirst", "Every decision we make prioritizes patient safety and well-being."),
                ("evidenceBased", "We rely on scientific evidence and clinical best practices."),
                ("compassionate", "We approach healthcare with empathy and understanding."),
            ],
            &[
                ("safety", "Patient safety above all"),
                ("quality", "Clinical excellence"),
                ("compassion", "Empathetic care"),
                ("integrity", "Ethical practices"),
            ],
            "We are a healthcare company committed to improving patient outcomes through innovative, evidence-based solutions.",
        ),
        "finance" => (
            Tone::Formal,
            Style::Concise,
            &["strategic", "technical", "customer-support"],
            &[
                ("trust", "Trust is the foundation of all financial relationships."),
                ("transparency", "Clear, honest communication builds lasting partnerships."),
                ("security", "Protecting client assets and data is paramount."),
            ],
            &[
                ("trust", "Building lasting relationships"),
                ("security", "Protecting client assets"),
                ("transparency", "Clear communication"),
                ("excellence", "Financial expertise"),
            ],
            "We are a financial services company that prioritizes trust, security, and transparent communication in all client relationships.",
        ),
        "education" => (
            Tone::Friendly,
            Style::Conversational,
            &["customer-support", "strategic", "creative"],
            &[
                ("lifelongLearning", "Education is a journey that never ends."),
                ("accessibility", "Knowledge should be available to everyone."),
                ("empowerment", "Education empowers individuals to reach their potential."),
            ],
            &[
                ("learning", "Continuous growth"),
                ("accessibility", "Inclusive education"),
                ("empowerment", "Student success"),
                ("innovation", "Modern learning methods"),
            ],
            "We are an education company dedicated to making learning accessible, engaging, and empowering for all students.",
        ),
        "retail" => (
            Tone::Friendly,
            Style::Conversational,
            &["customer-support", "sales", "creative"],
            &[
                ("customerCentric", "The customer is at the heart of everything we do."),
                ("experience", "We create memorable shopping experiences."),
                ("convenience", "We make shopping easy and enjoyable."),
            ],
            &[
                ("service", "Exceptional customer service"),
                ("quality", "Premium products"),
                ("convenience", "Easy shopping experience"),
                ("innovation", "Modern retail solutions"),
            ],
            "We are a retail company focused on creating exceptional customer experiences through quality products and outstanding service.",
        ),
        "consulting" => (
            Tone::Professional,
            Style::Detailed,
            &["strategic", "technical", "customer-support"],
            &[
                ("expertise", "Deep knowledge and experience drive successful outcomes."),
                ("partnership", "We work as trusted partners with our clients."),
                ("results", "We deliver measurable, lasting results."),
            ],
            &[
                ("expertise", "Deep knowledge"),
                ("partnership", "Trusted collaboration"),
                ("results", "Measurable outcomes"),
                ("integrity", "Ethical consulting"),
            ],
            "We are a consulting firm that partners with clients to deliver strategic solutions and measurable results through deep expertise.",
        ),
        _ => (
            Tone::Enthusiastic,
            Style::Technical,
            &["technical", "strategic", "innovative"],
            &[
                ("innovation", "We believe in pushing technological boundaries and creating solutions that transform industries."),
                ("userCentric", "Technology should serve human needs and enhance human capabilities."),
                ("continuousLearning", "We embrace rapid iteration and continuous improvement."),
            ],
            &[
                ("innovation", "Pioneering new solutions"),
                ("excellence", "Technical excellence and quality"),
                ("collaboration", "Cross-functional teamwork"),
                ("impact", "Creating meaningful change"),
            ],
            "We are a technology company that believes in the power of innovation to solve complex problems and create positive impact.",
        ),
    };

    let display_industry = if normalized.is_empty() {
        "technology".to_string()
    } else {
        normalized.clone()
    };
    let mut title_industry = display_industry.clone();
    if let Some(first) = title_industry.get_mut(0..1) {
        first.make_ascii_uppercase();
    }

    IndustryProfile {
        name: format!("{title_industry} Professional"),
        description: format!("AI personality optimized for {display_industry} industry"),
        config: PersonalityConfig {
            tone,
            style,
            expertise: expertise.iter().map(|s| s.to_string()).collect(),
            philosophy: philosophy
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            brand_voice: Some(brand_voice.replacen("We are a", &format!("{company_name} is a"), 1)),
            custom_prompt: None,
            response_length: ResponseLength::Medium,
            language: "en".to_string(),
        },
    }
}
