use serde::{Deserialize, Serialize};

/// Structured petition assessment returned by the LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub analysis_summary: AnalysisSummary,
    pub prong_analysis: ProngAnalysis,
    pub overall_assessment: OverallAssessment,
    #[serde(default)]
    pub future_plan_draft: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub field_of_expertise: String,
    pub key_achievements: String,
}

/// The three NIW prongs (Matter of Dhanasar).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProngAnalysis {
    /// Substantial merit and national importance.
    pub prong_1: ProngScore,
    /// Well positioned to advance the proposed endeavor.
    pub prong_2: ProngScore,
    /// On balance, waiving the labor certification benefits the U.S.
    pub prong_3: ProngScore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProngScore {
    /// 0 – 10
    pub score: f32,
    pub reasoning: String,
    pub suggestions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverallAssessment {
    /// 0 – 30, the sum of the prong scores as judged by the model.
    pub total_score: f32,
    pub success_probability_niw: String,
    pub success_probability_eb1a: String,
    pub overall_suggestions: String,
}

/// A publication the applicant lists alongside their free-text profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicationInput {
    pub title: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub citations: Option<u64>,
    #[serde(default)]
    pub impact_factor: Option<f64>,
}
