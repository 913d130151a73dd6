use std::sync::Arc;

use nova_types::{supertype_walk, ClassSymbol, MemberSymbol, TypeEnv};
use serde::Serialize;

pub const TARGET_API: &str = "android.annotation.TargetApi";
pub const REQUIRES_API: &str = "androidx.annotation.RequiresApi";

/// A member that is only available above some platform level, as seen through `receiver`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GatedMember {
    pub member: MemberSymbol,
    /// Class that declares `member`.
    pub owner: String,
    /// Most-derived class the member is verified through. Equal to `owner` for declared members.
    pub receiver: String,
    pub required_api: u32,
}

impl GatedMember {
    pub fn is_inherited(&self) -> bool {
        self.owner != self.receiver
    }
}

/// Which annotations gate a member and from which level on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GateRules {
    pub annotations: Vec<String>,
    /// Members gated at or below this level are always available.
    pub min_api: u32,
}

impl Default for GateRules {
    fn default() -> Self {
        Self {
            annotations: vec![TARGET_API.to_string(), REQUIRES_API.to_string()],
            min_api: 1,
        }
    }
}

impl GateRules {
    /// The API level `member` requires, if it is above `min_api`.
    ///
    /// `@RequiresApi` may carry its level in `api` instead of `value`; the first positive one is
    /// used. When several gate annotations are present the highest level wins.
    pub fn required_api(&self, member: &MemberSymbol) -> Option<u32> {
        member
            .annotations
            .iter()
            .filter(|annotation| self.annotations.iter().any(|gate| *gate == annotation.name))
            .filter_map(|annotation| {
                ["value", "api"]
                    .into_iter()
                    .filter_map(|element| annotation.element(element)?.as_int())
                    .find(|level| *level > 0)
            })
            .filter_map(|level| u32::try_from(level).ok())
            .max()
            .filter(|level| *level > self.min_api)
    }
}

/// Gated members visible on `class`: its own, then the ones it inherits without overriding,
/// nearest supertype first. Each one uses `class` as its receiver.
pub fn gated_members(env: &dyn TypeEnv, class: &ClassSymbol, rules: &GateRules) -> Vec<GatedMember> {
    let mut out = Vec::new();
    let mut visited: Vec<Arc<ClassSymbol>> = Vec::new();

    collect_declared(class, &class.name, rules, &[], &mut out);

    for ancestor in supertype_walk(env, &class.name) {
        if ancestor.name == class.name {
            continue;
        }
        let mut nearer: Vec<&ClassSymbol> = vec![class];
        nearer.extend(visited.iter().map(|c| c.as_ref()));
        collect_declared(&ancestor, &class.name, rules, &nearer, &mut out);
        visited.push(ancestor);
    }

    out
}

fn collect_declared(
    declaring: &ClassSymbol,
    receiver: &str,
    rules: &GateRules,
    nearer: &[&ClassSymbol],
    out: &mut Vec<GatedMember>,
) {
    for member in &declaring.members {
        let Some(required_api) = rules.required_api(member) else {
            continue;
        };
        let overridden = nearer
            .iter()
            .any(|class| class.members.iter().any(|m| m.overrides_shape_of(member)));
        if overridden {
            continue;
        }
        out.push(GatedMember {
            member: member.clone(),
            owner: declaring.name.clone(),
            receiver: receiver.to_string(),
            required_api,
        });
    }
}
