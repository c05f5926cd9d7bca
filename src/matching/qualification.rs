use once_cell::sync::Lazy;
use regex::Regex;

use crate::catalog::Program;
use crate::grades::{GradeScale, ANY_SYMBOL};

static GRADE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(any|[a-e])([+-]?)").expect("grade token pattern is valid"));

/// Grade symbols mentioned in a free-text requirement, normalized to the
/// scale's spelling. Letters inside words ("Degree", "Company") are skipped.
pub fn grade_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for caps in GRADE_TOKEN.captures_iter(text) {
        let (Some(head), Some(sign)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if sign.as_str().is_empty() {
            let followed_by_word = text[head.end()..]
                .chars()
                .next()
                .map(|c| c.is_alphanumeric() || c == '_')
                .unwrap_or(false);
            if followed_by_word {
                continue;
            }
        }
        let token = if head.as_str().eq_ignore_ascii_case(ANY_SYMBOL) {
            ANY_SYMBOL.to_string()
        } else {
            format!("{}{}", head.as_str().to_ascii_uppercase(), sign.as_str())
        };
        tokens.push(token);
    }
    tokens
}

/// Whether a stored minimum-grade requirement is met by a student of
/// `student_rank`. The requirement text is checked for any symbol the student
/// satisfies; a blank requirement is treated as `Any`.
pub fn qualifies(requirement: &str, student_rank: u8) -> bool {
    if requirement.trim().is_empty() {
        return true;
    }
    let accepted = GradeScale::symbols_up_to(student_rank);
    grade_tokens(requirement)
        .iter()
        .any(|token| accepted.contains(&token.as_str()))
}

pub fn qualified_programs(programs: Vec<Program>, student_rank: u8) -> Vec<Program> {
    programs
        .into_iter()
        .filter(|p| qualifies(&p.minimum_mean_grade, student_rank))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::Grade;

    #[test]
    fn tokenizes_free_text_requirements() {
        assert_eq!(grade_tokens("C+"), vec!["C+"]);
        assert_eq!(grade_tokens("c-/D+"), vec!["C-", "D+"]);
        assert_eq!(grade_tokens("KCSE Mean Grade B or Any"), vec!["B", "Any"]);
        assert!(grade_tokens("Degree").is_empty());
        assert!(grade_tokens("Company").is_empty());
    }

    #[test]
    fn c_plus_student_boundaries() {
        let rank = Grade::CPlus.rank();
        for requirement in ["C+", "C", "C-", "D+", "D", "D-", "E", "Any"] {
            assert!(qualifies(requirement, rank), "{requirement} should qualify");
        }
        for requirement in ["B-", "B", "B+", "A-", "A"] {
            assert!(!qualifies(requirement, rank), "{requirement} should not qualify");
        }
    }

    #[test]
    fn modifier_suffix_is_not_mistaken_for_bare_letter() {
        // "C+" contains the letter C, but a C student is one rank short.
        assert!(!qualifies("C+", Grade::C.rank()));
        assert!(qualifies("C-", Grade::C.rank()));
    }

    #[test]
    fn equal_rank_passes_and_one_above_fails_for_every_grade() {
        for grade in Grade::ALL {
            assert!(qualifies(grade.symbol(), grade.rank()));
            if let Some(next) = grade.next() {
                assert!(!qualifies(next.symbol(), grade.rank()));
            }
        }
    }

    #[test]
    fn any_and_blank_always_qualify() {
        assert!(qualifies("Any", Grade::E.rank()));
        assert!(qualifies("", Grade::E.rank()));
        assert!(qualifies("  ", Grade::E.rank()));
    }

    #[test]
    fn composite_requirement_matches_any_listed_symbol() {
        assert!(qualifies("B+ (or C+ with diploma)", Grade::CPlus.rank()));
        assert!(!qualifies("B+ (or C+ with diploma)", Grade::C.rank()));
    }

    #[test]
    fn unrecognised_text_never_qualifies() {
        assert!(!qualifies("see prospectus", Grade::A.rank()));
    }

    #[test]
    fn filters_program_lists() {
        let programs = vec![
            Program::new("A", "Degree", "Law").with_minimum_grade("B"),
            Program::new("B", "Diploma", "Law").with_minimum_grade("C"),
        ];
        let kept = qualified_programs(programs, Grade::C.rank());
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "B");
    }
}
