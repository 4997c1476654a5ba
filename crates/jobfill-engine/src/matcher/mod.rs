//! Descriptor to profile-key matching.
//!
//! Layers, first hit wins:
//!
//! 1. **Exact** - normalized label equals the key or one of its synonyms
//! 2. **Fuzzy** - best similarity over keys and synonyms at or above the
//!    threshold; ties go to the smaller edit distance, then to the key
//!    declared first in the profile
//! 3. **Inferred** - the field's semantic type has exactly one unclaimed key
//! 4. otherwise unmatched
//!
//! Singular keys are claimed once, in document order (visible fields
//! before hidden ones). Repeatable keys hand out their elements in order.

pub mod normalize;
pub mod similarity;

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use jobfill_config::MatcherConfig;
use jobfill_protocols::{
    Confidence, FieldClassification, FieldDescriptor, FillPlan, InferenceStrategy, InputKind,
    MatchResult, Profile, ProfileValue, Scalar, SemanticType,
};

use self::normalize::{match_tokens, normalize, normalize_identifier};
use self::similarity::{levenshtein, score};

/// Score recorded for matches made by the semantic-type layer.
const INFERRED_SCORE: f64 = 0.5;

const SCORE_EPSILON: f64 = 1e-9;

/// Layered field matcher.
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    threshold: f64,
    min_confidence: f64,
    /// Normalized synonym phrases per profile key.
    synonyms: HashMap<String, Vec<String>>,
    semantic_types: HashMap<String, SemanticType>,
}

impl Default for FieldMatcher {
    fn default() -> Self {
        Self::new(&MatcherConfig::default())
    }
}

/// A profile key with everything needed to compare it to labels.
struct Candidate<'p> {
    key: &'p str,
    position: usize,
    phrases: Vec<String>,
    semantic: SemanticType,
}

/// Key claims of one matching run.
struct Claims<'p> {
    profile: &'p Profile,
    claimed: HashSet<&'p str>,
    cursors: HashMap<&'p str, usize>,
}

impl<'p> Claims<'p> {
    fn new(profile: &'p Profile) -> Self {
        Self {
            profile,
            claimed: HashSet::new(),
            cursors: HashMap::new(),
        }
    }

    fn available(&self, key: &str) -> bool {
        match self.profile.get(key) {
            Some(value) if value.is_repeatable() => {
                self.cursors.get(key).copied().unwrap_or(0) < value.capacity()
            }
            Some(_) => !self.claimed.contains(key),
            None => false,
        }
    }

    /// Claim the next value of `key`.
    fn take(&mut self, key: &'p str) -> Option<Scalar> {
        if !self.available(key) {
            return None;
        }
        let profile = self.profile;
        match profile.get(key)? {
            ProfileValue::Many(values) => {
                let cursor = self.cursors.entry(key).or_insert(0);
                let value = values.get(*cursor).cloned();
                *cursor += 1;
                value
            }
            ProfileValue::One(value) => {
                self.claimed.insert(key);
                Some(value.clone())
            }
        }
    }
}

/// Best fuzzy hit so far.
struct FuzzyHit<'p> {
    key: &'p str,
    score: f64,
    distance: usize,
    position: usize,
}

impl FuzzyHit<'_> {
    /// Higher score, then smaller edit distance, then earlier declaration.
    fn beats(&self, other: &FuzzyHit<'_>) -> bool {
        if (self.score - other.score).abs() > SCORE_EPSILON {
            return self.score > other.score;
        }
        match self.distance.cmp(&other.distance) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.position < other.position,
        }
    }
}

impl FieldMatcher {
    pub fn new(config: &MatcherConfig) -> Self {
        let synonyms = config
            .effective_synonyms()
            .into_iter()
            .map(|(key, phrases)| {
                let mut normalized: Vec<String> = Vec::new();
                for phrase in phrases.iter().map(|p| normalize(p)) {
                    if !phrase.is_empty() && !normalized.contains(&phrase) {
                        normalized.push(phrase);
                    }
                }
                (key, normalized)
            })
            .collect();
        let semantic_types = config
            .effective_semantic_types()
            .into_iter()
            .filter_map(|(key, name)| semantic_type_from_name(&name).map(|t| (key, t)))
            .collect();

        Self {
            threshold: config.fuzzy_threshold,
            min_confidence: config.inference_min_confidence,
            synonyms,
            semantic_types,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Match every descriptor with the local layers. Results come back in
    /// the order of `descriptors`.
    pub fn match_fields(
        &self,
        descriptors: &[FieldDescriptor],
        profile: &Profile,
    ) -> Vec<MatchResult> {
        let candidates = self.candidates(profile);
        let (results, _) = self.match_local(descriptors, &candidates, profile);
        results
    }

    /// [`match_fields`](Self::match_fields), then ask `strategy` about
    /// visible fields still unmatched. Answers under the confidence cutoff,
    /// unknown categories, claimed keys and strategy failures all leave the
    /// field unmatched.
    pub async fn match_with_assist(
        &self,
        descriptors: &[FieldDescriptor],
        profile: &Profile,
        strategy: &dyn InferenceStrategy,
        api_key: &str,
    ) -> Vec<MatchResult> {
        let candidates = self.candidates(profile);
        let (mut results, mut claims) = self.match_local(descriptors, &candidates, profile);

        let mut pending: Vec<usize> = (0..descriptors.len())
            .filter(|&i| !results[i].is_matched())
            .filter(|&i| descriptors[i].visible && !descriptors[i].label.is_empty())
            .collect();
        pending.sort_by_key(|&i| descriptors[i].order);

        for i in pending {
            let descriptor = &descriptors[i];
            let classification = match strategy.classify(&descriptor.label, api_key).await {
                Ok(classification) => classification,
                Err(e) => {
                    warn!(strategy = strategy.id(), label = %descriptor.label, error = %e, "Field classification failed");
                    continue;
                }
            };
            if classification.confidence + SCORE_EPSILON < self.min_confidence {
                debug!(
                    label = %descriptor.label,
                    category = %classification.category,
                    confidence = classification.confidence,
                    "Classification below cutoff"
                );
                continue;
            }
            if let Some(result) =
                self.resolve_category(descriptor, &classification, &candidates, &mut claims)
            {
                results[i] = result;
            }
        }
        results
    }

    /// Fill plan of the matched results.
    pub fn plan(results: Vec<MatchResult>) -> FillPlan {
        FillPlan::from_results(results)
    }

    fn candidates<'p>(&self, profile: &'p Profile) -> Vec<Candidate<'p>> {
        profile
            .iter()
            .enumerate()
            .map(|(position, (key, value))| {
                let mut phrases = vec![normalize_identifier(key)];
                for phrase in self.synonyms.get(key).into_iter().flatten() {
                    if !phrases.contains(phrase) {
                        phrases.push(phrase.clone());
                    }
                }
                Candidate {
                    key,
                    position,
                    phrases,
                    semantic: self
                        .semantic_types
                        .get(key)
                        .copied()
                        .unwrap_or_else(|| value_shape(value)),
                }
            })
            .collect()
    }

    fn match_local<'p>(
        &self,
        descriptors: &[FieldDescriptor],
        candidates: &[Candidate<'p>],
        profile: &'p Profile,
    ) -> (Vec<MatchResult>, Claims<'p>) {
        let mut claims = Claims::new(profile);
        let mut order: Vec<usize> = (0..descriptors.len()).collect();
        order.sort_by_key(|&i| (!descriptors[i].visible, descriptors[i].order));

        let mut slots: Vec<Option<MatchResult>> = vec![None; descriptors.len()];
        for i in order {
            slots[i] = Some(self.match_one(&descriptors[i], candidates, &mut claims));
        }
        let results: Vec<MatchResult> = slots.into_iter().flatten().collect();

        debug!(
            fields = results.len(),
            matched = results.iter().filter(|r| r.is_matched()).count(),
            "Matched fields"
        );
        (results, claims)
    }

    fn match_one<'p>(
        &self,
        descriptor: &FieldDescriptor,
        candidates: &[Candidate<'p>],
        claims: &mut Claims<'p>,
    ) -> MatchResult {
        if !descriptor.label.is_empty() {
            if let Some(result) = self.match_exact(descriptor, candidates, claims) {
                return result;
            }
            if let Some(result) = self.match_fuzzy(descriptor, candidates, claims) {
                return result;
            }
        }
        self.match_inferred(descriptor, candidates, claims)
            .unwrap_or_else(|| MatchResult::unmatched(descriptor.clone()))
    }

    fn match_exact<'p>(
        &self,
        descriptor: &FieldDescriptor,
        candidates: &[Candidate<'p>],
        claims: &mut Claims<'p>,
    ) -> Option<MatchResult> {
        let candidate = candidates.iter().find(|c| {
            claims.available(c.key) && c.phrases.iter().any(|p| *p == descriptor.label)
        })?;
        let value = claims.take(candidate.key)?;
        Some(MatchResult::matched(
            descriptor.clone(),
            candidate.key,
            Confidence::Exact,
            value,
            1.0,
        ))
    }

    fn match_fuzzy<'p>(
        &self,
        descriptor: &FieldDescriptor,
        candidates: &[Candidate<'p>],
        claims: &mut Claims<'p>,
    ) -> Option<MatchResult> {
        let label = match_tokens(&descriptor.label);
        if label.is_empty() {
            return None;
        }
        let label_text = label.join(" ");

        let mut best: Option<FuzzyHit<'p>> = None;
        for candidate in candidates.iter().filter(|c| claims.available(c.key)) {
            for phrase in &candidate.phrases {
                let tokens = match_tokens(phrase);
                let s = score(&label, &tokens);
                if s + SCORE_EPSILON < self.threshold {
                    continue;
                }
                let hit = FuzzyHit {
                    key: candidate.key,
                    score: s,
                    distance: levenshtein(&label_text, &tokens.join(" ")),
                    position: candidate.position,
                };
                if best.as_ref().is_none_or(|b| hit.beats(b)) {
                    best = Some(hit);
                }
            }
        }

        let hit = best?;
        let value = claims.take(hit.key)?;
        Some(MatchResult::matched(
            descriptor.clone(),
            hit.key,
            Confidence::Fuzzy,
            value,
            hit.score,
        ))
    }

    fn match_inferred<'p>(
        &self,
        descriptor: &FieldDescriptor,
        candidates: &[Candidate<'p>],
        claims: &mut Claims<'p>,
    ) -> Option<MatchResult> {
        let expected = expected_type(descriptor)?;
        let mut remaining = candidates
            .iter()
            .filter(|c| c.semantic == expected && claims.available(c.key));
        let candidate = remaining.next()?;
        if remaining.next().is_some() {
            return None;
        }
        let value = claims.take(candidate.key)?;
        Some(MatchResult::matched(
            descriptor.clone(),
            candidate.key,
            Confidence::Inferred,
            value,
            INFERRED_SCORE,
        ))
    }

    fn resolve_category<'p>(
        &self,
        descriptor: &FieldDescriptor,
        classification: &FieldClassification,
        candidates: &[Candidate<'p>],
        claims: &mut Claims<'p>,
    ) -> Option<MatchResult> {
        let category = normalize(&classification.category);
        if category.is_empty() || category == "other" {
            return None;
        }
        let Some(candidate) = candidates
            .iter()
            .find(|c| claims.available(c.key) && c.phrases.contains(&category))
        else {
            debug!(label = %descriptor.label, category = %category, "No unclaimed key for category");
            return None;
        };
        let value = claims.take(candidate.key)?;
        Some(MatchResult::matched(
            descriptor.clone(),
            candidate.key,
            Confidence::Inferred,
            value,
            (classification.confidence / 100.0).clamp(0.0, 1.0),
        ))
    }
}

/// Semantic type a field expects, from its input type or kind.
fn expected_type(descriptor: &FieldDescriptor) -> Option<SemanticType> {
    match (descriptor.semantic_hint, descriptor.kind) {
        (Some(hint), _) => Some(hint),
        (None, InputKind::File) => Some(SemanticType::Document),
        _ => None,
    }
}

/// Semantic type guessed from a profile value.
fn value_shape(value: &ProfileValue) -> SemanticType {
    let first = match value {
        ProfileValue::One(scalar) => Some(scalar),
        ProfileValue::Many(scalars) => scalars.first(),
    };
    match first {
        Some(Scalar::Bool(_)) => SemanticType::Boolean,
        Some(Scalar::Number(_)) => SemanticType::Number,
        Some(Scalar::Text(text)) => {
            let text = text.trim();
            if text.starts_with("http://") || text.starts_with("https://") {
                SemanticType::Url
            } else if !text.contains(char::is_whitespace)
                && text.split_once('@').is_some_and(|(user, host)| {
                    !user.is_empty() && host.contains('.')
                })
            {
                SemanticType::Email
            } else {
                SemanticType::Text
            }
        }
        None => SemanticType::Text,
    }
}

fn semantic_type_from_name(name: &str) -> Option<SemanticType> {
    match name.trim().to_lowercase().as_str() {
        "text" => Some(SemanticType::Text),
        "email" => Some(SemanticType::Email),
        "phone" => Some(SemanticType::Phone),
        "url" => Some(SemanticType::Url),
        "number" => Some(SemanticType::Number),
        "date" => Some(SemanticType::Date),
        "boolean" => Some(SemanticType::Boolean),
        "document" => Some(SemanticType::Document),
        _ => None,
    }
}

#[cfg(test)]
#[path = "matcher_tests.rs"]
mod tests;
