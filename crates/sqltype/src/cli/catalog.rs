//! `types` and `signatures` commands

use anyhow::{Context, Result};
use sqltype_ast::Operator;
use sqltype_check::lookup;
use sqltype_types::{SessionConfig, TypeTag, common_type};

/// Common type of two type names under the session's compatibility mode
pub fn common_type_of_names(left: &str, right: &str, config: &SessionConfig) -> Result<TypeTag> {
    let left: TypeTag = left.parse().context("Invalid left type")?;
    let right: TypeTag = right.parse().context("Invalid right type")?;
    let common = common_type(left, right, config.compat_mode);
    log::debug!("common type of {} and {}: {}", left, right, common);
    Ok(common)
}

/// One line per overload of `operator`, in preference order
pub fn signature_lines(operator: &str, config: &SessionConfig) -> Result<Vec<String>> {
    let op: Operator = operator.parse().context("Invalid operator")?;
    let lines = match lookup(op, config) {
        Some(signature) => signature
            .iter()
            .enumerate()
            .map(|(i, overload)| format!("{:>2}. {} {}", i, op.name(), overload))
            .collect(),
        None => vec![format!("{} is typed from its operands", op.name())],
    };
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("integer", "double", TypeTag::Double)]
    #[case("varchar", "char", TypeTag::VarChar)]
    #[case("date", "varchar", TypeTag::Date)]
    fn test_common_type_of_names(#[case] left: &str, #[case] right: &str, #[case] expected: TypeTag) {
        let config = SessionConfig::default();
        assert_eq!(common_type_of_names(left, right, &config).unwrap(), expected);
    }

    #[test]
    fn test_unknown_type_name_fails() {
        assert!(common_type_of_names("widget", "integer", &SessionConfig::default()).is_err());
    }

    #[test]
    fn test_signature_lines_list_overloads() {
        let lines = signature_lines("=", &SessionConfig::default()).unwrap();
        assert!(lines.len() > 1);
        assert!(lines[0].starts_with(" 0. ="));
    }

    #[test]
    fn test_propagated_operator_has_no_overloads() {
        let lines = signature_lines("case", &SessionConfig::default()).unwrap();
        assert_eq!(lines, vec!["CASE is typed from its operands".to_string()]);
    }
}
