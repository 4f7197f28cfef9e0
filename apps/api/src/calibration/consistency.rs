//! Consistency Validator: keeps narrative prose in line with the locked tier.
//!
//! Reject tiers may not carry apply language unless a negator directly governs it; endorsing
//! tiers may not carry skip language (including negated apply language such as
//! "not a strong fit"). Offending sentences are replaced (rationale / strategic action) or
//! dropped (list items). All prose is then moved into second person. Nothing here can touch the tier or the score.

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::{debug, warn};

use crate::calibration::narrative::{Narrative, NarrativeField, NarrativeKind};
use crate::calibration::recommendation::{LockedRecommendation, Tier};
use crate::calibration::text::{phrase_offsets, split_sentences};
use crate::calibration::violations::{ContractViolation, ViolationLedger};

pub const SKIP_SIGNALS: &[&str] = &[
    "do not apply",
    "don't apply",
    "not recommended",
    "skip this role",
    "pass on this role",
    "not a fit",
    "poor fit",
    "weak fit",
];

pub const APPLY_SIGNALS: &[&str] = &[
    "strong fit",
    "great fit",
    "excellent fit",
    "perfect fit",
    "excellent match",
    "strong match",
    "ideal candidate",
    "highly qualified",
    "well-qualified",
    "strongly recommend",
    "apply immediately",
];

/// Words that negate an apply phrase when they directly govern it.
const NEGATIONS: &[&str] = &["not", "never"];

const ARTICLES: &[&str] = &["a", "an", "the"];

fn normalize(text: &str) -> String {
    text.to_lowercase().replace('’', "'")
}

fn is_negator(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

/// True only when a negator sits directly before the phrase, optionally followed by an
/// article: "not strong fit", "not a strong fit", "isn't an excellent match".
/// Looser cues such as "without question" or "no doubt" do not count.
fn is_negated(lower: &str, offset: usize) -> bool {
    let mut words = lower[..offset].split_whitespace().rev();
    match words.next() {
        Some(w) if is_negator(w) => true,
        Some(w) if ARTICLES.contains(&w) => words.next().is_some_and(is_negator),
        _ => false,
    }
}

/// The first phrase in `text` that contradicts `tier`, if any.
pub fn find_contradiction(tier: Tier, text: &str) -> Option<String> {
    let lower = normalize(text);

    if tier.is_reject() {
        return APPLY_SIGNALS
            .iter()
            .find(|p| {
                phrase_offsets(&lower, p)
                    .into_iter()
                    .any(|o| !is_negated(&lower, o))
            })
            .map(|p| p.to_string());
    }

    if let Some(p) = SKIP_SIGNALS
        .iter()
        .find(|p| !phrase_offsets(&lower, p).is_empty())
    {
        return Some(p.to_string());
    }
    APPLY_SIGNALS
        .iter()
        .find(|p| {
            phrase_offsets(&lower, p)
                .into_iter()
                .any(|o| is_negated(&lower, o))
        })
        .map(|p| format!("not {p}"))
}

/// Post-condition check for a single field.
pub fn check_field(tier: Tier, field: &NarrativeField) -> Result<(), ContractViolation> {
    match find_contradiction(tier, &field.text) {
        Some(phrase) => Err(ContractViolation::NarrativeContradictsTier {
            field: field.kind,
            tier,
            phrase,
        }),
        None => Ok(()),
    }
}

fn substitute_sentence(tier: Tier) -> &'static str {
    match tier {
        Tier::DoNotApply => "Your background does not yet meet the core requirements for this role.",
        Tier::ApplyWithCaution => {
            "Your background covers part of what this role asks for, so weigh the fit carefully before applying."
        }
        Tier::ConditionalApply => {
            "Your background lines up with parts of this role if you make the connection explicit."
        }
        Tier::Apply | Tier::StronglyApply => {
            "Your background lines up with the core requirements for this role."
        }
    }
}

/// Returns the rewritten text and how many sentences were removed.
fn remove_contradictions(text: &str, tier: Tier, substitute: Option<&str>) -> (String, usize) {
    let mut kept: Vec<&str> = Vec::new();
    let mut removed = 0;

    for sentence in split_sentences(text) {
        if find_contradiction(tier, sentence).is_none() {
            kept.push(sentence);
            continue;
        }
        removed += 1;
        if removed == 1 {
            if let Some(s) = substitute {
                kept.push(s);
            }
        }
    }

    if removed == 0 {
        return (text.to_string(), 0);
    }
    (kept.join(" "), removed)
}

// ────────────────────────────────────────────────────────────────────────────
// Second-person rewriting
// ────────────────────────────────────────────────────────────────────────────

/// Generic third-person references. Matched case-insensitively.
const GENERIC_SUBJECTS: &str = "(?i:the candidate|this candidate|the applicant|this applicant)";

const PRONOUN_SUBJECTS: &str = "(?i:he|she)";

/// Single-token names that double as ordinary words. They are never rewritten on their own.
const COMMON_WORD_NAMES: &[&str] = &[
    "amber", "april", "art", "august", "baker", "bell", "bill", "black", "brown", "case", "chase",
    "cook", "dawn", "don", "drew", "faith", "fisher", "fox", "frank", "grant", "gray", "green",
    "grey", "guy", "hall", "hill", "holly", "hope", "hunter", "iris", "ivy", "jack", "joy", "june",
    "king", "lane", "long", "mark", "max", "may", "miles", "park", "pat", "pearl", "penny", "price",
    "ray", "read", "reed", "rich", "rob", "rose", "ruby", "sage", "sky", "stone", "sue", "summer",
    "sunny", "victor", "wade", "ward", "white", "will", "wolf", "wood", "young",
];

/// Words ending in "s" that follow a subject without being third-person verbs.
const NON_VERBS_ENDING_S: &[&str] = &[
    "across", "always", "as", "besides", "its", "less", "perhaps", "sometimes", "this", "thus",
    "towards", "unless", "whereas",
];

/// Words after "her" that mark it as an object ("praised her and ...") rather than a possessive.
const OBJECT_FOLLOWERS: &[&str] = &[
    "a", "about", "after", "again", "also", "an", "and", "as", "at", "back", "because", "before",
    "but", "by", "directly", "during", "for", "from", "he", "i", "if", "in", "into", "it", "of",
    "on", "or", "out", "over", "she", "since", "so", "that", "the", "they", "this", "to", "too",
    "until", "up", "we", "well", "when", "while", "with", "you",
];

#[derive(Debug, Clone, Copy)]
enum Form {
    /// "the candidate's", "his" → "your"
    Possessive,
    /// "she's" → "you're"
    Contraction,
    /// "the candidate has" → "you have"
    SubjectVerb,
    /// "she leads" → "you lead"
    SubjectPresent,
    Bare,
    /// "her" is possessive or object depending on the next word
    Her,
    Object,
    Reflexive,
    Hers,
}

/// Rewrites third-person references to the candidate as "you"/"your".
/// Built per invocation because it embeds the candidate's name.
#[derive(Debug)]
pub struct SecondPersonRewriter {
    rules: Vec<(Regex, Form)>,
}

/// Full name plus first and last tokens. Names are matched case-sensitively.
fn name_variants(candidate_name: Option<&str>) -> Vec<String> {
    let Some(name) = candidate_name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Vec::new();
    };
    let mut variants = vec![name.to_string()];
    let parts: Vec<&str> = name.split_whitespace().collect();
    if parts.len() > 1 {
        for part in [parts[0], parts[parts.len() - 1]] {
            if part.chars().count() >= 2 && !variants.iter().any(|v| v == part) {
                variants.push(part.to_string());
            }
        }
    }
    variants.retain(|v| {
        v.contains(char::is_whitespace) || !COMMON_WORD_NAMES.contains(&v.to_lowercase().as_str())
    });
    variants
}

fn starts_sentence(text: &str, pos: usize) -> bool {
    text[..pos]
        .trim_end()
        .chars()
        .next_back()
        .map_or(true, |c| matches!(c, '.' | '!' | '?' | ':'))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// "leads" → "lead", "pushes" → "push", "tries" → "try".
fn base_form(verb: &str) -> String {
    if let Some(stem) = verb.strip_suffix("ies").filter(|s| s.len() >= 2) {
        return format!("{stem}y");
    }
    if ["sses", "shes", "ches", "xes", "zes", "oes"]
        .iter()
        .any(|suffix| verb.ends_with(suffix))
    {
        return verb[..verb.len() - 2].to_string();
    }
    if verb.ends_with("ss") {
        return verb.to_string();
    }
    verb[..verb.len() - 1].to_string()
}

fn replacement(form: Form, caps: &Captures) -> String {
    let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
    match form {
        Form::Possessive => "your".to_string(),
        Form::Contraction => "you're".to_string(),
        Form::Bare | Form::Object => "you".to_string(),
        Form::Reflexive => "yourself".to_string(),
        Form::Hers => "yours".to_string(),
        Form::SubjectVerb => match group(1).to_lowercase().as_str() {
            "is" => "you are",
            "has" => "you have",
            "was" => "you were",
            _ => "you do",
        }
        .to_string(),
        Form::SubjectPresent => {
            let verb = group(1);
            if NON_VERBS_ENDING_S.contains(&verb) {
                format!("you {verb}")
            } else {
                format!("you {}", base_form(verb))
            }
        }
        Form::Her => {
            let next = group(1);
            let next_word = next.trim().to_lowercase();
            if next.is_empty() || OBJECT_FOLLOWERS.contains(&next_word.as_str()) {
                format!("you{next}")
            } else {
                format!("your{next}")
            }
        }
    }
}

impl SecondPersonRewriter {
    pub fn new(candidate_name: Option<&str>) -> Self {
        let mut names = name_variants(candidate_name);
        // Longest first so "Jane Doe" is consumed before "Jane"
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        let nouns = std::iter::once(GENERIC_SUBJECTS.to_string())
            .chain(names.iter().map(|n| regex::escape(n)))
            .collect::<Vec<_>>()
            .join("|");
        let subjects = format!("{nouns}|{PRONOUN_SUBJECTS}");

        let patterns = [
            (format!(r"\b(?:{nouns})(?:'s|’s)"), Form::Possessive),
            (format!(r"\b{PRONOUN_SUBJECTS}(?:'s|’s)\b"), Form::Contraction),
            (
                format!(r"\b(?:{subjects})\s+((?i:is|has|was|does))\b"),
                Form::SubjectVerb,
            ),
            (format!(r"\b(?:{subjects})\s+([a-z]+s)\b"), Form::SubjectPresent),
            (format!(r"\b(?:{subjects})\b"), Form::Bare),
            (r"\b(?i:his)\b".to_string(), Form::Possessive),
            (r"\b(?i:her)\b(\s+[A-Za-z][\w-]*)?".to_string(), Form::Her),
            (r"\b(?i:him)\b".to_string(), Form::Object),
            (r"\b(?i:himself|herself)\b".to_string(), Form::Reflexive),
            (r"\b(?i:hers)\b".to_string(), Form::Hers),
        ];

        let rules = patterns
            .into_iter()
            .filter_map(|(pattern, form)| match Regex::new(&pattern) {
                Ok(re) => Some((re, form)),
                Err(e) => {
                    warn!("Skipping second-person rule: {e}");
                    None
                }
            })
            .collect();

        Self { rules }
    }

    pub fn rewrite(&self, text: &str) -> String {
        let mut current = text.to_string();
        for (re, form) in &self.rules {
            let source = current.clone();
            current = re
                .replace_all(&source, |caps: &Captures| {
                    let start = caps.get(0).map_or(0, |m| m.start());
                    let replaced = replacement(*form, caps);
                    if starts_sentence(&source, start) {
                        capitalize(&replaced)
                    } else {
                        replaced
                    }
                })
                .into_owned();
        }
        current
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Validator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsistencyOutcome {
    pub sentences_removed: usize,
    pub fields_rewritten: usize,
    pub items_dropped: usize,
}

/// Rewrites one field in place. Returns `false` if a list item ended up empty.
fn rewrite_field(
    field: &mut NarrativeField,
    tier: Tier,
    rewriter: &SecondPersonRewriter,
    outcome: &mut ConsistencyOutcome,
) -> bool {
    let substitute = match field.kind {
        NarrativeKind::Strength | NarrativeKind::Gap => None,
        _ => Some(substitute_sentence(tier)),
    };
    let (text, removed) = remove_contradictions(&field.text, tier, substitute);
    let text = rewriter.rewrite(&text);

    if removed > 0 {
        debug!(kind = ?field.kind, removed, "Removed tier-contradicting sentences");
        outcome.sentences_removed += removed;
    }
    if text != field.text {
        outcome.fields_rewritten += 1;
        field.text = text;
    }
    !field.text.trim().is_empty()
}

/// Runs the validator over every narrative field. The recommendation is read-only here.
pub fn enforce_consistency(
    narrative: &mut Narrative,
    locked: &LockedRecommendation,
    rewriter: &SecondPersonRewriter,
    ledger: &mut ViolationLedger,
) -> ConsistencyOutcome {
    let tier = locked.tier();
    let mut outcome = ConsistencyOutcome::default();

    for list in [&mut narrative.strengths, &mut narrative.gaps] {
        let before = list.len();
        list.retain_mut(|field| rewrite_field(field, tier, rewriter, &mut outcome));
        outcome.items_dropped += before - list.len();
    }
    for slot in [&mut narrative.rationale, &mut narrative.strategic_action] {
        if let Some(field) = slot.as_mut() {
            if !rewrite_field(field, tier, rewriter, &mut outcome) {
                *slot = None;
            }
        }
    }

    for field in narrative.fields() {
        ledger.check(check_field(tier, field));
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::hard_cap::enforce_hard_cap;
    use crate::calibration::recommendation::PendingRecommendation;

    fn locked(score: i64) -> LockedRecommendation {
        PendingRecommendation::from_fit(&enforce_hard_cap(0.0, 0.0, score)).lock()
    }

    fn narrative_with_rationale(text: &str) -> Narrative {
        Narrative {
            rationale: Some(NarrativeField::new(NarrativeKind::Rationale, text)),
            ..Narrative::default()
        }
    }

    fn contains_any(text: &str, phrases: &[&str]) -> bool {
        let lower = text.to_lowercase();
        phrases.iter().any(|p| lower.contains(p))
    }

    #[test]
    fn test_signal_sets_are_disjoint() {
        for skip in SKIP_SIGNALS {
            for apply in APPLY_SIGNALS {
                assert!(!skip.contains(apply) && !apply.contains(skip), "{skip} / {apply}");
            }
        }
    }

    /// CRITICAL: DoNotApply + "strong fit" never ships an apply phrase.
    #[test]
    fn test_reject_tier_strips_apply_language() {
        let lock = locked(40);
        let mut narrative = narrative_with_rationale(
            "Jane is a strong fit for this team. Her sourcing depth is notable.",
        );
        let rewriter = SecondPersonRewriter::new(Some("Jane"));
        let mut ledger = ViolationLedger::new();

        let outcome = enforce_consistency(&mut narrative, &lock, &rewriter, &mut ledger);

        let text = &narrative.rationale.as_ref().unwrap().text;
        assert!(!contains_any(text, APPLY_SIGNALS), "still contradicts: {text}");
        assert_eq!(
            text,
            "Your background does not yet meet the core requirements for this role. \
             Your sourcing depth is notable."
        );
        assert_eq!(outcome.sentences_removed, 1);
        assert!(ledger.is_empty());
        assert_eq!(lock.tier(), Tier::DoNotApply);
    }

    #[test]
    fn test_negated_apply_language_is_consistent_with_reject() {
        assert_eq!(find_contradiction(Tier::DoNotApply, "This is not a strong fit."), None);
        assert_eq!(find_contradiction(Tier::DoNotApply, "You aren't an excellent match yet."), None);
        assert_eq!(find_contradiction(Tier::DoNotApply, "Never a strong match here."), None);
    }

    /// CRITICAL: a negation word nearby does not excuse apply language under a reject tier.
    #[test]
    fn test_loose_negation_does_not_excuse_apply_language() {
        assert_eq!(
            find_contradiction(Tier::DoNotApply, "Without question an excellent match for the team."),
            Some("excellent match".to_string())
        );
        assert_eq!(
            find_contradiction(Tier::DoNotApply, "No doubt a strong fit."),
            Some("strong fit".to_string())
        );
        assert_eq!(
            find_contradiction(Tier::DoNotApply, "Not surprising. A strong fit."),
            Some("strong fit".to_string())
        );

        let lock = locked(20);
        let mut narrative =
            narrative_with_rationale("Without question an excellent match for the team.");
        let mut ledger = ViolationLedger::new();
        let outcome = enforce_consistency(
            &mut narrative,
            &lock,
            &SecondPersonRewriter::new(None),
            &mut ledger,
        );
        let text = &narrative.rationale.as_ref().unwrap().text;
        assert!(!contains_any(text, APPLY_SIGNALS), "still contradicts: {text}");
        assert_eq!(outcome.sentences_removed, 1);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_endorsing_tier_strips_skip_language() {
        assert_eq!(
            find_contradiction(Tier::Apply, "We would not recommended it; do not apply."),
            Some("do not apply".to_string())
        );
        assert_eq!(
            find_contradiction(Tier::StronglyApply, "Honestly not a strong fit."),
            Some("not strong fit".to_string())
        );
        assert_eq!(find_contradiction(Tier::Apply, "A strong fit overall."), None);
    }

    #[test]
    fn test_apply_caution_counts_as_reject() {
        assert!(find_contradiction(Tier::ApplyWithCaution, "An excellent match.").is_some());
    }

    #[test]
    fn test_contradicting_list_item_is_dropped() {
        let lock = locked(30);
        let mut narrative = Narrative {
            strengths: vec![
                NarrativeField::new(NarrativeKind::Strength, "Excellent match on sourcing."),
                NarrativeField::new(NarrativeKind::Strength, "Ran hiring for 3 teams. Strong fit overall."),
            ],
            ..Narrative::default()
        };
        let mut ledger = ViolationLedger::new();
        let outcome = enforce_consistency(
            &mut narrative,
            &lock,
            &SecondPersonRewriter::new(None),
            &mut ledger,
        );
        assert_eq!(narrative.strengths.len(), 1);
        assert_eq!(narrative.strengths[0].text, "Ran hiring for 3 teams.");
        assert_eq!(outcome.items_dropped, 1);
    }

    #[test]
    fn test_second_person_rewrite_with_name() {
        let rewriter = SecondPersonRewriter::new(Some("Jane Doe"));
        let out = rewriter.rewrite(
            "Jane Doe has 12 years. Jane's sourcing is deep. The candidate is ready. We believe Doe was early.",
        );
        assert_eq!(
            out,
            "You have 12 years. Your sourcing is deep. You are ready. We believe you were early."
        );
    }

    #[test]
    fn test_second_person_rewrite_pronouns() {
        let rewriter = SecondPersonRewriter::new(None);
        assert_eq!(
            rewriter.rewrite("She has led sourcing. The team praised his work"),
            "You have led sourcing. The team praised your work"
        );
        assert_eq!(rewriter.rewrite("He's ready."), "You're ready.");
    }

    #[test]
    fn test_second_person_rewrite_object_and_possessive_her() {
        let rewriter = SecondPersonRewriter::new(None);
        assert_eq!(
            rewriter.rewrite(
                "Her sourcing depth is notable. Recruiters praised her and we would hire him."
            ),
            "Your sourcing depth is notable. Recruiters praised you and we would hire you."
        );
        assert_eq!(
            rewriter.rewrite("She taught herself SQL and the offer was hers. We thanked her."),
            "You taught yourself SQL and the offer was yours. We thanked you."
        );
    }

    #[test]
    fn test_second_person_keeps_verb_agreement() {
        let rewriter = SecondPersonRewriter::new(Some("Jane"));
        assert_eq!(
            rewriter.rewrite("She leads sourcing and Jane manages offers. He pushes hard. She tries again."),
            "You lead sourcing and you manage offers. You push hard. You try again."
        );
        assert_eq!(rewriter.rewrite("She always shipped"), "You always shipped");
    }

    #[test]
    fn test_common_word_names_do_not_rewrite_prose() {
        let rewriter = SecondPersonRewriter::new(Some("Will Mark"));
        assert_eq!(
            rewriter.rewrite("Will Mark led sourcing. The team will grow and hit every mark."),
            "You led sourcing. The team will grow and hit every mark."
        );
        assert_eq!(
            rewriter.rewrite("Will this scale? Mark the date."),
            "Will this scale? Mark the date."
        );
    }

    #[test]
    fn test_names_match_case_sensitively() {
        let rewriter = SecondPersonRewriter::new(Some("Jordan Banks"));
        assert_eq!(
            rewriter.rewrite("Jordan ran the desk. Savings banks were the clients."),
            "You ran the desk. Savings banks were the clients."
        );
    }

    #[test]
    fn test_second_person_leaves_other_words_alone() {
        let rewriter = SecondPersonRewriter::new(Some("Al"));
        assert_eq!(
            rewriter.rewrite("The theme of the chapter"),
            "The theme of the chapter"
        );
        // "Al" must not fire inside "also"
        assert_eq!(rewriter.rewrite("Also, Al built it"), "Also, you built it");
    }

    #[test]
    fn test_name_with_regex_metacharacters_is_escaped() {
        let rewriter = SecondPersonRewriter::new(Some("J. (Jay) Smith"));
        assert_eq!(rewriter.rewrite("J. (Jay) Smith has range"), "You have range");
    }

    #[test]
    fn test_consistent_text_is_untouched() {
        let lock = locked(85);
        let mut narrative = narrative_with_rationale("Your sourcing depth lines up with the role.");
        let mut ledger = ViolationLedger::new();
        let outcome = enforce_consistency(
            &mut narrative,
            &lock,
            &SecondPersonRewriter::new(None),
            &mut ledger,
        );
        assert_eq!(outcome, ConsistencyOutcome::default());
        assert!(ledger.is_empty());
    }
}
