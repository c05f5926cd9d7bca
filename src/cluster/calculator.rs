use crate::cluster::{ClusterFamily, ClusterScoreSet};
use crate::grades::subjects::{Subject, SubjectGradeSet};

use Subject::*;

/// One of the four subject positions in a cluster formula.
#[derive(Debug, Clone, Copy)]
pub enum Slot {
    Single(Subject),
    BestOf(&'static [Subject]),
}

impl Slot {
    fn points(&self, grades: &SubjectGradeSet) -> u8 {
        match self {
            Slot::Single(subject) => grades.points(*subject),
            Slot::BestOf(subjects) => grades.best_of(subjects),
        }
    }
}

const MEDICINE: [Slot; 4] = [
    Slot::Single(Biology),
    Slot::Single(Chemistry),
    Slot::BestOf(&[Mathematics, Physics]),
    Slot::BestOf(&[English, Kiswahili]),
];

const ENGINEERING: [Slot; 4] = [
    Slot::Single(Mathematics),
    Slot::Single(Physics),
    Slot::Single(Chemistry),
    Slot::BestOf(&[
        English,
        Kiswahili,
        Biology,
        Geography,
        History,
        Cre,
        BusinessStudies,
        Agriculture,
    ]),
];

const LAW: [Slot; 4] = [
    Slot::Single(English),
    Slot::BestOf(&[Kiswahili, French, German]),
    Slot::BestOf(&[Mathematics, Biology, Physics, Chemistry]),
    Slot::BestOf(&[History, Geography, Cre, BusinessStudies]),
];

const ARTS: [Slot; 4] = [
    Slot::Single(English),
    Slot::BestOf(&[Mathematics, Biology, Physics, Chemistry]),
    Slot::BestOf(&[History, Geography, Cre]),
    Slot::BestOf(&[Kiswahili, French, German, BusinessStudies, Music]),
];

pub fn formula(family: ClusterFamily) -> &'static [Slot; 4] {
    match family {
        ClusterFamily::Medicine => &MEDICINE,
        ClusterFamily::Engineering => &ENGINEERING,
        ClusterFamily::Law => &LAW,
        ClusterFamily::Arts => &ARTS,
    }
}

pub fn family_score(family: ClusterFamily, grades: &SubjectGradeSet) -> f64 {
    formula(family)
        .iter()
        .map(|slot| f64::from(slot.points(grades)))
        .sum()
}

pub fn calculate_clusters(grades: &SubjectGradeSet) -> ClusterScoreSet {
    ClusterScoreSet {
        medicine: family_score(ClusterFamily::Medicine, grades),
        engineering: family_score(ClusterFamily::Engineering, grades),
        law: family_score(ClusterFamily::Law, grades),
        arts: family_score(ClusterFamily::Arts, grades),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grades::scale::Grade;

    fn sample_student() -> SubjectGradeSet {
        SubjectGradeSet::new()
            .with(Biology, Grade::B)
            .with(Chemistry, Grade::CPlus)
            .with(Mathematics, Grade::C)
            .with(English, Grade::BMinus)
            .with(Kiswahili, Grade::C)
    }

    #[test]
    fn medicine_uses_best_of_alternatives() {
        let clusters = calculate_clusters(&sample_student());
        assert_eq!(clusters.medicine, 30.0);
    }

    #[test]
    fn every_family_matches_hand_computed_totals() {
        let grades = sample_student()
            .with(History, Grade::BPlus)
            .with(French, Grade::AMinus)
            .with(Music, Grade::D);
        let clusters = calculate_clusters(&grades);
        // maths 6 + physics 0 + chemistry 7 + best(english 8, biology 9, history 10, ..)
        assert_eq!(clusters.engineering, 23.0);
        // english 8 + french 11 + biology 9 + history 10
        assert_eq!(clusters.law, 38.0);
        // english 8 + biology 9 + history 10 + french 11
        assert_eq!(clusters.arts, 38.0);
    }

    #[test]
    fn empty_grades_score_zero_everywhere() {
        let clusters = calculate_clusters(&SubjectGradeSet::new());
        assert_eq!(clusters, ClusterScoreSet::default());
    }

    #[test]
    fn missing_subjects_never_add_points() {
        let grades = SubjectGradeSet::new().with(English, Grade::A);
        let clusters = calculate_clusters(&grades);
        assert_eq!(clusters.medicine, 12.0);
        assert_eq!(clusters.engineering, 12.0);
        assert_eq!(clusters.law, 12.0);
        assert_eq!(clusters.arts, 12.0);
    }

    #[test]
    fn calculation_is_deterministic() {
        let grades = sample_student().with(Physics, Grade::AMinus);
        let first = calculate_clusters(&grades);
        let second = calculate_clusters(&grades);
        for family in ClusterFamily::ALL {
            assert_eq!(first.score(family).to_bits(), second.score(family).to_bits());
        }
    }

    #[test]
    fn maximum_possible_score_is_forty_eight() {
        let mut grades = SubjectGradeSet::new();
        for subject in Subject::ALL {
            grades.set_grade(subject, Grade::A);
        }
        for (_, score) in calculate_clusters(&grades).iter() {
            assert_eq!(score, 48.0);
        }
    }
}
