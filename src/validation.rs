//! Pure shape/format checks, invoked before any write. First violation wins;
//! nothing here touches the database.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::db::models::{PlanConfig, Role};
use crate::error::{AppError, AppResult, ErrorCode};

static TEAM_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9-]{2,50}$").unwrap());

// RFC-light: one '@', non-empty local and domain parts, a dot in the domain.
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 255;
const MAX_TEAM_NAME_LEN: usize = 100;

pub fn validate_team_id(team_id: &str) -> AppResult<()> {
    if TEAM_ID_RE.is_match(team_id) {
        Ok(())
    } else {
        Err(AppError::domain(
            ErrorCode::InvalidTeamId,
            "Team ID must be 2-50 lowercase letters, digits or hyphens",
        ))
    }
}

// Length limits count characters, not bytes, so accented names get the full
// budget.
pub fn validate_team_name(name: &str) -> AppResult<()> {
    if name.is_empty() || name.chars().count() > MAX_TEAM_NAME_LEN {
        return Err(AppError::domain(
            ErrorCode::InvalidTeamName,
            "Team name must be 1-100 characters",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> AppResult<()> {
    if email.len() > MAX_EMAIL_LEN || !EMAIL_RE.is_match(email) {
        return Err(AppError::domain(
            ErrorCode::InvalidEmail,
            format!("'{}' is not a valid email address", email),
        ));
    }
    Ok(())
}

pub fn validate_display_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::domain(
            ErrorCode::InvalidName,
            "Name must be non-empty and at most 255 characters",
        ));
    }
    Ok(())
}

/// Checks every submitted role name against the closed set and returns the
/// parsed roles as a set: duplicates collapse, first occurrence keeps its
/// position.
pub fn validate_roles(roles: &[String]) -> AppResult<Vec<Role>> {
    let mut parsed = Vec::new();
    for r in roles {
        let role = r.parse::<Role>().map_err(|_| {
            AppError::domain(
                ErrorCode::InvalidRole,
                format!("'{}' is not a valid role (expected 'manager' or 'admin')", r),
            )
        })?;
        if !parsed.contains(&role) {
            parsed.push(role);
        }
    }
    Ok(parsed)
}

/// Structural validation of the rubric tree. Reports the first violation
/// encountered, naming the offending node.
pub fn validate_plan_config(config: &PlanConfig) -> AppResult<()> {
    let invalid = |message: String| AppError::domain(ErrorCode::InvalidPlanConfig, message);

    if config.is_empty() {
        return Err(invalid("planConfig must contain at least one category".into()));
    }
    for (ci, category) in config.iter().enumerate() {
        if category.title.trim().is_empty() {
            return Err(invalid(format!("category {} is missing a title", ci + 1)));
        }
        if category.competencies.is_empty() {
            return Err(invalid(format!(
                "category '{}' has no competencies",
                category.title
            )));
        }
        for competency in &category.competencies {
            if competency.name.trim().is_empty() {
                return Err(invalid(format!(
                    "category '{}' contains a competency without a name",
                    category.title
                )));
            }
            if competency.levels.is_empty() {
                return Err(invalid(format!(
                    "competency '{}' has no levels",
                    competency.name
                )));
            }
            for level in &competency.levels {
                if level.title.trim().is_empty() {
                    return Err(invalid(format!(
                        "competency '{}' level {} is missing a title",
                        competency.name, level.level
                    )));
                }
                if level.content.trim().is_empty() {
                    return Err(invalid(format!(
                        "competency '{}' level {} is missing content",
                        competency.name, level.level
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{Category, Competency, LevelExpectation};

    fn code_of(result: AppResult<()>) -> ErrorCode {
        result.unwrap_err().code().expect("expected a domain error")
    }

    #[test]
    fn team_id_accepts_slug_shapes() {
        for id in ["eng", "platform-infra", "t2", "a-1-b-2"] {
            assert!(validate_team_id(id).is_ok(), "{id}");
        }
    }

    #[test]
    fn team_id_rejects_non_slug_shapes() {
        for id in ["", "e", "Eng", "eng team", "eng_team", "é-team", &"x".repeat(51)] {
            assert_eq!(code_of(validate_team_id(id)), ErrorCode::InvalidTeamId, "{id}");
        }
    }

    #[test]
    fn team_name_bounds() {
        assert!(validate_team_name("Engineering").is_ok());
        assert!(validate_team_name(&"n".repeat(100)).is_ok());
        assert_eq!(code_of(validate_team_name("")), ErrorCode::InvalidTeamName);
        assert_eq!(
            code_of(validate_team_name(&"n".repeat(101))),
            ErrorCode::InvalidTeamName
        );
    }

    #[test]
    fn name_limits_count_characters_not_bytes() {
        // 100 two-byte characters fit the team-name budget.
        assert!(validate_team_name(&"é".repeat(100)).is_ok());
        assert_eq!(
            code_of(validate_team_name(&"é".repeat(101))),
            ErrorCode::InvalidTeamName
        );
        // Same for the 255-character display-name budget.
        assert!(validate_display_name(&"ü".repeat(255)).is_ok());
        assert_eq!(
            code_of(validate_display_name(&"ü".repeat(256))),
            ErrorCode::InvalidName
        );
    }

    #[test]
    fn email_shapes() {
        assert!(validate_email("ada@example.com").is_ok());
        for bad in ["", "ada", "ada@", "@example.com", "ada@example", "a b@example.com"] {
            assert_eq!(code_of(validate_email(bad)), ErrorCode::InvalidEmail, "{bad}");
        }
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(code_of(validate_email(&long)), ErrorCode::InvalidEmail);
    }

    #[test]
    fn display_name_rejects_blank_and_oversize() {
        assert!(validate_display_name("Ada Lovelace").is_ok());
        assert_eq!(code_of(validate_display_name("   ")), ErrorCode::InvalidName);
        assert_eq!(
            code_of(validate_display_name(&"n".repeat(256))),
            ErrorCode::InvalidName
        );
    }

    #[test]
    fn roles_closed_set() {
        let parsed = validate_roles(&["manager".into(), "admin".into()]).unwrap();
        assert_eq!(parsed, vec![Role::Manager, Role::Admin]);
        assert!(validate_roles(&[]).unwrap().is_empty());
        let err = validate_roles(&["root".into()]).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidRole));
    }

    #[test]
    fn roles_collapse_to_a_set() {
        let parsed = validate_roles(&["admin".into(), "admin".into()]).unwrap();
        assert_eq!(parsed, vec![Role::Admin]);
        let parsed =
            validate_roles(&["manager".into(), "admin".into(), "manager".into()]).unwrap();
        assert_eq!(parsed, vec![Role::Manager, Role::Admin]);
    }

    fn level(n: i32) -> LevelExpectation {
        LevelExpectation {
            level: n,
            title: format!("L{n}"),
            content: "Does the thing".into(),
            description: None,
        }
    }

    fn competency(name: &str) -> Competency {
        Competency {
            name: name.into(),
            description: None,
            levels: vec![level(1)],
        }
    }

    fn category(title: &str) -> Category {
        Category {
            title: title.into(),
            description: None,
            competencies: vec![competency("Delivery")],
        }
    }

    #[test]
    fn plan_config_accepts_minimal_tree() {
        assert!(validate_plan_config(&vec![category("Impact")]).is_ok());
    }

    #[test]
    fn plan_config_rejects_empty_tree() {
        let err = code_of(validate_plan_config(&vec![]));
        assert_eq!(err, ErrorCode::InvalidPlanConfig);
    }

    #[test]
    fn plan_config_first_violation_wins() {
        // Both the first category (no title) and the second (no competencies)
        // are broken; the reported message names the first.
        let mut first = category("");
        first.competencies.clear();
        let second = Category {
            title: "Craft".into(),
            description: None,
            competencies: vec![],
        };
        let err = validate_plan_config(&vec![first, second]).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::InvalidPlanConfig));
        assert!(err.to_string().contains("category 1 is missing a title"));
    }

    #[test]
    fn plan_config_rejects_structural_gaps() {
        let mut c = category("Impact");
        c.competencies[0].levels.clear();
        assert_eq!(code_of(validate_plan_config(&vec![c])), ErrorCode::InvalidPlanConfig);

        let mut c = category("Impact");
        c.competencies[0].name = " ".into();
        assert_eq!(code_of(validate_plan_config(&vec![c])), ErrorCode::InvalidPlanConfig);

        let mut c = category("Impact");
        c.competencies[0].levels[0].content = "".into();
        let err = validate_plan_config(&vec![c]).unwrap_err();
        assert!(err.to_string().contains("missing content"));
    }
}
