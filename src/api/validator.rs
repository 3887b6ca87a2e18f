// ==========================================
// FFCS 课表规划器 - 课程表单校验器
// ==========================================
// 职责: 分配前的表单校验（ValidationError）
// 红线: 校验在任何存储变更之前完成,失败时状态不变
// ==========================================

use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::engine::assignment_store::AssignRequest;
use crate::i18n::{t, t_with_args};

/// 课程代码最大长度
pub const MAX_COURSE_CODE_LEN: usize = 32;
/// 课程名 / 教师名最大长度
pub const MAX_NAME_LEN: usize = 128;

// ==========================================
// AssignForm - 课程表单
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignForm {
    pub course_code: String,
    pub course_name: String,
    #[serde(default)]
    pub professor_name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl AssignForm {
    pub fn new(course_code: &str, course_name: &str, professor_name: &str) -> Self {
        Self {
            course_code: course_code.to_string(),
            course_name: course_name.to_string(),
            professor_name: professor_name.to_string(),
            color: None,
        }
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }
}

/// 校验表单并转换为分配请求
///
/// # 验证规则
/// 1. 课程代码、课程名去除首尾空白后不能为空
/// 2. 字段长度不超过上限
/// 3. 颜色（如提供）必须为 #RGB 或 #RRGGBB
///
/// # 返回
/// - Ok(AssignRequest): 去除空白后的请求
/// - Err(ApiError::ValidationError): 第一处校验失败
pub fn validate_assign_form(form: &AssignForm) -> ApiResult<AssignRequest> {
    let course_code = form.course_code.trim();
    let course_name = form.course_name.trim();
    let professor_name = form.professor_name.trim();

    if course_code.is_empty() {
        return Err(ApiError::ValidationError(t("validation.course_code_required")));
    }
    if course_name.is_empty() {
        return Err(ApiError::ValidationError(t("validation.course_name_required")));
    }

    check_length("courseCode", course_code, MAX_COURSE_CODE_LEN)?;
    check_length("courseName", course_name, MAX_NAME_LEN)?;
    check_length("professorName", professor_name, MAX_NAME_LEN)?;

    let color = match form.color.as_deref().map(str::trim) {
        Some(c) if c.is_empty() => None,
        Some(c) if is_hex_color(c) => Some(c.to_string()),
        Some(c) => {
            return Err(ApiError::ValidationError(t_with_args(
                "validation.color_invalid",
                &[("color", c)],
            )))
        }
        None => None,
    };

    Ok(AssignRequest {
        course_code: course_code.to_string(),
        course_name: course_name.to_string(),
        professor_name: professor_name.to_string(),
        color,
    })
}

fn check_length(field: &str, value: &str, max: usize) -> ApiResult<()> {
    if value.chars().count() > max {
        let max = max.to_string();
        return Err(ApiError::ValidationError(t_with_args(
            "validation.field_too_long",
            &[("field", field), ("max", max.as_str())],
        )));
    }
    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_form_is_trimmed() {
        let form = AssignForm::new("  CSE1001 ", " Problem Solving ", " Dr. Rao ").with_color("#10b981");
        let request = validate_assign_form(&form).unwrap();
        assert_eq!(request.course_code, "CSE1001");
        assert_eq!(request.course_name, "Problem Solving");
        assert_eq!(request.professor_name, "Dr. Rao");
        assert_eq!(request.color.as_deref(), Some("#10b981"));
    }

    #[test]
    fn test_blank_required_fields() {
        let form = AssignForm::new("   ", "Physics", "");
        assert!(matches!(validate_assign_form(&form), Err(ApiError::ValidationError(_))));

        let form = AssignForm::new("PHY1001", "\t", "");
        assert!(matches!(validate_assign_form(&form), Err(ApiError::ValidationError(_))));

        // 教师名可为空
        let form = AssignForm::new("PHY1001", "Physics", "");
        assert!(validate_assign_form(&form).is_ok());
    }

    #[test]
    fn test_color_and_length_rules() {
        let form = AssignForm::new("PHY1001", "Physics", "").with_color("blue");
        assert!(validate_assign_form(&form).is_err());

        let form = AssignForm::new("PHY1001", "Physics", "").with_color("#FFF");
        assert!(validate_assign_form(&form).is_ok());

        let form = AssignForm::new("PHY1001", "Physics", "").with_color("  ");
        assert_eq!(validate_assign_form(&form).unwrap().color, None);

        let long_code = "X".repeat(MAX_COURSE_CODE_LEN + 1);
        let form = AssignForm::new(&long_code, "Physics", "");
        assert!(validate_assign_form(&form).is_err());
    }
}
