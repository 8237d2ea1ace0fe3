use ksb_core::{Category, ItemSpec};

/// Built-in item set shown when no other list is supplied.
const DEFAULT_ITEMS: &[(&str, &str, &str)] = &[
    ("K1", "Knowledge", "K1 Theories of learning & reflective practice"),
    ("K2", "Knowledge", "K2 Emotional & social intelligence theories"),
    ("K3", "Knowledge", "K3 Diversity, inclusion & bias theory"),
    ("K4", "Knowledge", "K4 Coaching contracting & re-contracting"),
    ("K5", "Knowledge", "K5 Organisational culture & leadership theory"),
    ("K6", "Knowledge", "K6 Coaching theory & good practice"),
    ("K7", "Knowledge", "K7 Communication & relationship theories"),
    ("K8", "Knowledge", "K8 Self-awareness theories"),
    ("K9", "Knowledge", "K9 Evaluation & ROI"),
    ("K10", "Knowledge", "K10 Differences: coaching vs mentoring etc."),
    ("K11", "Knowledge", "K11 Relevant legislation & codes"),
    ("K12", "Knowledge", "K12 Coaching models & techniques"),
    ("S1", "Skill", "S1 Time management & self-leadership"),
    ("S2", "Skill", "S2 Goal setting with coachee"),
    ("S3", "Skill", "S3 Communication about process"),
    ("S4", "Skill", "S4 Contracting with stakeholders"),
    ("S5", "Skill", "S5 Stakeholder management"),
    ("S6", "Skill", "S6 Rapport & trust building"),
    ("S7", "Skill", "S7 Delivering feedback"),
    ("S8", "Skill", "S8 Identifying patterns & beliefs"),
    ("S9", "Skill", "S9 Questioning techniques"),
    ("S10", "Skill", "S10 Use of models & tools"),
    ("S11", "Skill", "S11 Emotional intelligence in practice"),
    ("S12", "Skill", "S12 Apply theories beyond communication"),
    ("S13", "Skill", "S13 Identify energy shifts"),
    ("S14", "Skill", "S14 Manage and celebrate diversity"),
    ("S15", "Skill", "S15 Self-awareness & impact"),
    ("B1", "Behaviour", "B1 Committed to self-development"),
    ("B2", "Behaviour", "B2 Self-awareness & wellbeing"),
    ("B3", "Behaviour", "B3 Ambassador for coaching mindset"),
    ("B4", "Behaviour", "B4 Spontaneous, open & flexible"),
];

pub fn default_items() -> Vec<ItemSpec> {
    DEFAULT_ITEMS
        .iter()
        .map(|(id, category, title)| ItemSpec::new(*id, Category::from_label(category), *title))
        .collect()
}
