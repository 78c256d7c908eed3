//! The fixed diagnosis prompt and the response schema sent with it.

use serde_json::{json, Value};

/// Instruction sent alongside every image. Asks for a Simplified Chinese answer.
pub const DIAGNOSIS_PROMPT: &str = "你是一位专业的农业植物病理学家。请分析这张图片。判断它是否为植物。如果是，请识别植物种类，诊断具体的病害或虫害（如果是健康的也请确认），并提供详细的治疗建议。请使用简体中文（Simplified Chinese）返回所有文本内容。";

/// Output MIME type requested from the model.
pub const RESPONSE_MIME_TYPE: &str = "application/json";

/// Field names the model must return, in schema order.
pub const REQUIRED_FIELDS: [&str; 8] = [
    "isPlant",
    "plantName",
    "condition",
    "confidence",
    "description",
    "symptoms",
    "treatment",
    "prevention",
];

/// OpenAPI-style schema constraining the model output to `AnalysisResult`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "isPlant": {
                "type": "BOOLEAN",
                "description": "True if the image contains a plant, crop, or leaf."
            },
            "plantName": {
                "type": "STRING",
                "description": "The common name of the plant in Chinese."
            },
            "condition": {
                "type": "STRING",
                "description": "The name of the disease, pest, or '健康' (Healthy) in Chinese."
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Confidence level of diagnosis from 0 to 100."
            },
            "description": {
                "type": "STRING",
                "description": "A brief explanation of the condition in Chinese."
            },
            "symptoms": string_list("List of visible symptoms in Chinese."),
            "treatment": string_list("Step-by-step treatment recommendations in Chinese."),
            "prevention": string_list("Tips to prevent future outbreaks in Chinese."),
        },
        "required": REQUIRED_FIELDS,
    })
}

fn string_list(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_requires_all_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, REQUIRED_FIELDS);
        for field in REQUIRED_FIELDS {
            assert!(schema["properties"][field].is_object(), "{field} missing");
        }
        assert_eq!(schema["properties"]["confidence"]["type"], "NUMBER");
        assert_eq!(schema["properties"]["symptoms"]["items"]["type"], "STRING");
    }
}
