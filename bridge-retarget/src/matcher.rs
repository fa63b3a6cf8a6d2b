//! Fuzzy bone-name matching between skeletons.

use bridge_types::Skeleton;
use hashbrown::HashMap;
use levenshtein::levenshtein;
use tracing::{debug, info, warn};

use crate::mapping::{BoneMapping, MapEntry, MatchGrade, MatchReason};

/// Minimum confidence for an automatic match. Below it a source bone stays
/// unmapped.
pub const CONFIDENCE_CUTOFF: f64 = 0.3;

/// Boost applied when two bones sit at the same depth from their roots and
/// share sibling ordinal.
const STRUCTURAL_BOOST: f64 = 0.1;

/// Rig prefixes stripped during normalization.
const RIG_PREFIXES: &[&str] = &[
    "def_", "def-", "drv_", "drv-", "ctrl_", "ctrl-", "ik_", "ik-", "fk_", "fk-", "mch_", "mch-",
];

/// Rig suffixes stripped during normalization.
const RIG_SUFFIXES: &[&str] = &["_def", "-def", "_drv", "-drv", "_ctrl", "-ctrl"];

/// Canonical humanoid bone names with the variants seen across naming
/// conventions. Each group lists the canonical name's known aliases.
const BONE_ALIASES: &[(&str, &[&str])] = &[
    ("root", &["root", "main", "origin", "armature"]),
    ("pelvis", &["pelvis", "hips", "hip", "cog", "center_of_gravity"]),
    ("spine_01", &["spine", "spine1", "spine_01", "spine.001", "abdomen"]),
    ("spine_02", &["spine2", "spine_02", "spine.002", "chest_lower"]),
    ("spine_03", &["spine3", "spine_03", "spine.003", "chest", "chest_upper"]),
    ("spine_04", &["spine4", "spine_04", "spine.004"]),
    ("spine_05", &["spine5", "spine_05", "spine.005"]),
    ("neck_01", &["neck", "neck1", "neck_01", "neck.001"]),
    ("neck_02", &["neck2", "neck_02", "neck.002"]),
    ("head", &["head", "skull"]),
    (
        "clavicle_l",
        &["clavicle_l", "collar_l", "shoulder_l", "leftshoulder", "l_clavicle", "clavicle.l"],
    ),
    (
        "clavicle_r",
        &["clavicle_r", "collar_r", "shoulder_r", "rightshoulder", "r_clavicle", "clavicle.r"],
    ),
    (
        "upperarm_l",
        &["upperarm_l", "arm_l", "leftarm", "l_upperarm", "upper_arm_l", "upperarm.l"],
    ),
    (
        "upperarm_r",
        &["upperarm_r", "arm_r", "rightarm", "r_upperarm", "upper_arm_r", "upperarm.r"],
    ),
    (
        "lowerarm_l",
        &["lowerarm_l", "forearm_l", "leftforearm", "l_lowerarm", "lower_arm_l", "lowerarm.l"],
    ),
    (
        "lowerarm_r",
        &["lowerarm_r", "forearm_r", "rightforearm", "r_lowerarm", "lower_arm_r", "lowerarm.r"],
    ),
    ("hand_l", &["hand_l", "lefthand", "l_hand", "wrist_l", "hand.l"]),
    ("hand_r", &["hand_r", "righthand", "r_hand", "wrist_r", "hand.r"]),
    (
        "thigh_l",
        &["thigh_l", "upperleg_l", "leftupleg", "l_thigh", "upper_leg_l", "thigh.l"],
    ),
    (
        "thigh_r",
        &["thigh_r", "upperleg_r", "rightupleg", "r_thigh", "upper_leg_r", "thigh.r"],
    ),
    (
        "calf_l",
        &["calf_l", "lowerleg_l", "shin_l", "leftleg", "l_calf", "lower_leg_l", "calf.l"],
    ),
    (
        "calf_r",
        &["calf_r", "lowerleg_r", "shin_r", "rightleg", "r_calf", "lower_leg_r", "calf.r"],
    ),
    ("foot_l", &["foot_l", "leftfoot", "l_foot", "ankle_l", "foot.l"]),
    ("foot_r", &["foot_r", "rightfoot", "r_foot", "ankle_r", "foot.r"]),
    ("ball_l", &["ball_l", "toe_l", "lefttoebase", "l_ball", "toes_l", "ball.l"]),
    ("ball_r", &["ball_r", "toe_r", "righttoebase", "r_ball", "toes_r", "ball.r"]),
];

/// Finger name variants per digit.
const FINGER_PATTERNS: &[(&str, &[&str])] = &[
    ("thumb", &["thumb", "finger0", "finger_0"]),
    ("index", &["index", "finger1", "finger_1", "pointer"]),
    ("middle", &["middle", "finger2", "finger_2", "mid"]),
    ("ring", &["ring", "finger3", "finger_3"]),
    ("pinky", &["pinky", "finger4", "finger_4", "little", "small"]),
];

/// Body-part substrings whose presence in both names boosts fuzzy scores.
const KEY_BODY_PARTS: &[&str] = &[
    "spine", "arm", "leg", "hand", "foot", "head", "neck", "thigh", "calf", "shoulder",
];

const LEFT_PATTERNS: &[&str] = &[
    "_l", ".l", "-l", "left", "_left", ".left", "-left", "l_", "l.", "l-",
];
const RIGHT_PATTERNS: &[&str] = &[
    "_r", ".r", "-r", "right", "_right", ".right", "-right", "r_", "r.", "r-",
];

/// Which side of the body a bone name indicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Left-side affix present.
    Left,
    /// Right-side affix present.
    Right,
    /// No side affix.
    Center,
}

impl Side {
    /// Detect the side from a bone name's affixes.
    ///
    /// # Example
    ///
    /// ```
    /// use bridge_retarget::Side;
    ///
    /// assert_eq!(Side::of_name("hand_l"), Side::Left);
    /// assert_eq!(Side::of_name("RightFoot"), Side::Right);
    /// assert_eq!(Side::of_name("spine_01"), Side::Center);
    /// ```
    #[must_use]
    pub fn of_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if LEFT_PATTERNS.iter().any(|p| lower.contains(p)) {
            return Self::Left;
        }
        if RIGHT_PATTERNS.iter().any(|p| lower.contains(p)) {
            return Self::Right;
        }
        Self::Center
    }
}

/// Normalize a bone name for comparison: lowercase, trim, strip one rig
/// prefix and one rig suffix.
///
/// # Example
///
/// ```
/// use bridge_retarget::normalize_bone_name;
///
/// assert_eq!(normalize_bone_name("DEF_Spine_01"), "spine_01");
/// assert_eq!(normalize_bone_name("hand_l_ctrl"), "hand_l");
/// ```
#[must_use]
pub fn normalize_bone_name(name: &str) -> String {
    let mut name = name.trim().to_lowercase();
    for prefix in RIG_PREFIXES {
        if let Some(stripped) = name.strip_prefix(prefix) {
            name = stripped.to_string();
            break;
        }
    }
    for suffix in RIG_SUFFIXES {
        if let Some(stripped) = name.strip_suffix(suffix) {
            name = stripped.to_string();
            break;
        }
    }
    name
}

/// The canonical alias group containing `lowered`, if any.
fn alias_group(lowered: &str) -> Option<&'static (&'static str, &'static [&'static str])> {
    BONE_ALIASES
        .iter()
        .find(|(canonical, aliases)| lowered == *canonical || aliases.contains(&lowered))
}

/// Fuzzy name similarity in `[0, 1]`, before any structural boost.
///
/// Opposite-side names are a hard veto (score 0). Otherwise the score is
/// Levenshtein similarity over normalized names, boosted when both names
/// share a key body-part substring, and adjusted for finger agreement
/// (shared digit +0.2, digit on only one side −0.3 per differing group).
#[must_use]
fn name_similarity(source: &str, target: &str) -> f64 {
    let source_side = Side::of_name(source);
    let target_side = Side::of_name(target);
    if source_side != target_side && source_side != Side::Center && target_side != Side::Center {
        return 0.0;
    }

    let source_norm = normalize_bone_name(source);
    let target_norm = normalize_bone_name(target);
    let max_len = source_norm.len().max(target_norm.len());
    if max_len == 0 {
        return 0.0;
    }

    #[allow(clippy::cast_precision_loss)]
    let mut similarity =
        1.0 - levenshtein(&source_norm, &target_norm) as f64 / max_len as f64;

    for part in KEY_BODY_PARTS {
        if source_norm.contains(part) && target_norm.contains(part) {
            similarity = (similarity + 0.15).min(1.0);
            break;
        }
    }

    for (finger, patterns) in FINGER_PATTERNS {
        let in_source =
            patterns.iter().any(|p| source_norm.contains(p)) || source_norm.contains(finger);
        let in_target =
            patterns.iter().any(|p| target_norm.contains(p)) || target_norm.contains(finger);
        if in_source && in_target {
            similarity = (similarity + 0.2).min(1.0);
            break;
        }
        if in_source != in_target {
            similarity = (similarity - 0.3).max(0.0);
        }
    }

    similarity
}

/// Whether two bones occupy the same structural slot: equal depth from
/// their roots and equal ordinal among siblings.
fn same_structural_slot(source: &Skeleton, i: usize, target: &Skeleton, j: usize) -> bool {
    matches!(
        (source.depth(i), target.depth(j)),
        (Some(a), Some(b)) if a == b
    ) && matches!(
        (source.sibling_ordinal(i), target.sibling_ordinal(j)),
        (Some(a), Some(b)) if a == b
    )
}

/// Match source bones to target bones by name.
///
/// Resolution runs in passes, each claiming targets the later passes can no
/// longer use: manual overrides first (honored verbatim at confidence 1.0),
/// then exact case-insensitive name equality, then equality after rig
/// prefix/suffix normalization, then the canonical-alias table, and finally
/// fuzzy scoring. Fuzzy candidates across all remaining bones are assigned
/// globally in strictly descending score order (ties broken by source
/// declaration order, then target index), so an early source bone cannot
/// greedily claim a target that fits a later bone better.
///
/// Every source bone gets an entry; those without an acceptable match stay
/// explicitly unresolved. No two entries share a target.
///
/// # Example
///
/// ```
/// use bridge_retarget::match_bones;
/// use bridge_types::{Bone, Skeleton};
/// use hashbrown::HashMap;
///
/// let source = Skeleton::from_bones(vec![
///     Bone::new("Root", None),
///     Bone::new("Spine", Some(0)),
///     Bone::new("Head", Some(1)),
/// ]);
/// let target = Skeleton::from_bones(vec![
///     Bone::new("root", None),
///     Bone::new("spine_01", Some(0)),
///     Bone::new("head", Some(1)),
/// ]);
///
/// let mapping = match_bones(&source, &target, &HashMap::new());
/// assert_eq!(mapping.target_of(0), Some(0));
/// assert_eq!(mapping.target_of(1), Some(1));
/// assert_eq!(mapping.target_of(2), Some(2));
/// ```
#[must_use]
pub fn match_bones(
    source: &Skeleton,
    target: &Skeleton,
    overrides: &HashMap<String, String>,
) -> BoneMapping {
    info!(
        source_bones = source.len(),
        target_bones = target.len(),
        overrides = overrides.len(),
        "matching bones"
    );

    let mut assigned: Vec<Option<(u16, f64, MatchReason)>> = vec![None; source.len()];
    let mut used = vec![false; target.len()];

    // Manual overrides claim their targets before any automatic pass.
    for (i, bone) in source.bones.iter().enumerate() {
        let Some(wanted) = overrides.get(&bone.name) else {
            continue;
        };
        match target.bone_index(wanted) {
            Some(j) if !used[j] => {
                #[allow(clippy::cast_possible_truncation)]
                let j16 = j as u16;
                assigned[i] = Some((j16, 1.0, MatchReason::ManualOverride));
                used[j] = true;
            }
            Some(_) => warn!(source = %bone.name, target = %wanted, "override target already claimed"),
            None => warn!(source = %bone.name, target = %wanted, "override target not found"),
        }
    }

    // First target wins for duplicate names, in declaration order.
    let mut by_lower: HashMap<String, usize> = HashMap::new();
    let mut by_normalized: HashMap<String, usize> = HashMap::new();
    for (j, bone) in target.bones.iter().enumerate() {
        by_lower.entry(bone.name.to_lowercase()).or_insert(j);
        by_normalized.entry(normalize_bone_name(&bone.name)).or_insert(j);
    }

    // Exact case-insensitive names.
    for (i, bone) in source.bones.iter().enumerate() {
        if assigned[i].is_some() {
            continue;
        }
        if let Some(&j) = by_lower.get(&bone.name.to_lowercase()) {
            if !used[j] {
                #[allow(clippy::cast_possible_truncation)]
                let j16 = j as u16;
                assigned[i] = Some((j16, 1.0, MatchReason::Exact));
                used[j] = true;
            }
        }
    }

    // Equality after rig prefix/suffix stripping.
    for (i, bone) in source.bones.iter().enumerate() {
        if assigned[i].is_some() {
            continue;
        }
        if let Some(&j) = by_normalized.get(&normalize_bone_name(&bone.name)) {
            if !used[j] {
                #[allow(clippy::cast_possible_truncation)]
                let j16 = j as u16;
                assigned[i] = Some((j16, 0.95, MatchReason::Normalized));
                used[j] = true;
            }
        }
    }

    // Canonical alias groups.
    for (i, bone) in source.bones.iter().enumerate() {
        if assigned[i].is_some() {
            continue;
        }
        let Some((canonical, aliases)) = alias_group(&bone.name.to_lowercase()) else {
            continue;
        };
        for (j, target_bone) in target.bones.iter().enumerate() {
            if used[j] {
                continue;
            }
            let target_lower = target_bone.name.to_lowercase();
            if target_lower == *canonical || aliases.contains(&target_lower.as_str()) {
                #[allow(clippy::cast_possible_truncation)]
                let j16 = j as u16;
                assigned[i] = Some((j16, 0.90, MatchReason::Alias));
                used[j] = true;
                break;
            }
        }
    }

    // Global fuzzy assignment over everything still unresolved.
    let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
    for (i, bone) in source.bones.iter().enumerate() {
        if assigned[i].is_some() {
            continue;
        }
        for (j, target_bone) in target.bones.iter().enumerate() {
            if used[j] {
                continue;
            }
            let mut score = name_similarity(&bone.name, &target_bone.name);
            if score > 0.0 && same_structural_slot(source, i, target, j) {
                score = (score + STRUCTURAL_BOOST).min(1.0);
            }
            if score >= CONFIDENCE_CUTOFF {
                candidates.push((i, j, score));
            }
        }
    }
    candidates.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
            .then_with(|| a.1.cmp(&b.1))
    });
    for (i, j, score) in candidates {
        if assigned[i].is_some() || used[j] {
            continue;
        }
        #[allow(clippy::cast_possible_truncation)]
        let j16 = j as u16;
        assigned[i] = Some((j16, score, MatchReason::Fuzzy));
        used[j] = true;
        debug!(source = %source.bones[i].name, target = %target.bones[j].name, score, "fuzzy match");
    }

    let entries = assigned
        .into_iter()
        .enumerate()
        .map(|(i, slot)| {
            #[allow(clippy::cast_possible_truncation)]
            let source_index = i as u16;
            match slot {
                Some((target_index, confidence, reason)) => MapEntry {
                    source: source_index,
                    target: Some(target_index),
                    confidence,
                    grade: MatchGrade::from_confidence(confidence),
                    reason,
                },
                None => MapEntry {
                    source: source_index,
                    target: None,
                    confidence: 0.0,
                    grade: MatchGrade::None,
                    reason: MatchReason::Unmatched,
                },
            }
        })
        .collect();

    BoneMapping { entries }
}
