//! Prompt construction and the fixed subject/style catalogues.

/// Style value meaning "no style clause".
pub const NO_STYLE: &str = "None";

/// Art styles offered by the form, `None` first.
pub const ART_STYLES: &[&str] = &[
    NO_STYLE,
    "Van Gogh",
    "Hokusai",
    "Ghibli",
    "Basquiat",
    "Cubist",
    "Minimalist",
    "Impressionist",
    "Futurist",
    "Mondrian",
    "Andy Warhol",
    "Art Nouveau",
    "Street Art",
    "Surrealist",
    "Medical Illustration",
];

/// Anatomy terms used when a batch run is started without explicit subjects.
pub const ANATOMY_SUBJECTS: &[&str] = &[
    "Heart",
    "Lung",
    "Kidney",
    "Eye",
    "Brain",
    "Bladder",
    "Abdomen",
    "Uterus",
    "Skeleton",
    "Muscles",
    "Nervous system",
    "Venous system",
    "Arterial system",
    "Ear",
    "Nose",
    "Throat",
    "Knee",
    "Ankle",
    "Shoulder",
    "Vertebrae",
    "Elbow",
    "Hand",
    "Foot",
    "Male genitalia",
    "Female genitalia",
    "Oral cavity",
    "Skin",
    "Head",
];

/// Build the generation prompt for a subject and optional style.
///
/// A missing style, a blank one, or the [`NO_STYLE`] sentinel all produce a
/// prompt without a style clause.
#[must_use]
pub fn build_prompt(subject: &str, style: Option<&str>) -> String {
    let style_clause = match style.map(str::trim) {
        Some(s) if !s.is_empty() && s != NO_STYLE => format!(", in {s} style"),
        _ => String::new(),
    };
    format!(
        "Vibrant pop-art style human anatomy of {subject}{style_clause}, with anatomical \
         landmarks, suitable for wall art, highly detailed, colorful, 1024x1024 resolution"
    )
}
