//! Static skill catalog.

/// A skill that can be shown on the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skill {
    pub name: &'static str,
    /// Devicon class used by the presentation layer.
    pub icon: &'static str,
}

/// All skills the site knows how to display, in display order.
pub const SKILL_CATALOG: &[Skill] = &[
    Skill { name: "TypeScript", icon: "devicon-typescript-plain" },
    Skill { name: "React", icon: "devicon-react-original" },
    Skill { name: "Next.js", icon: "devicon-nextjs-original" },
    Skill { name: "Node.js", icon: "devicon-nodejs-plain" },
    Skill { name: "Python", icon: "devicon-python-plain" },
    Skill { name: "PostgreSQL", icon: "devicon-postgresql-plain" },
    Skill { name: "Docker", icon: "devicon-docker-plain" },
    Skill { name: "Tailwind CSS", icon: "devicon-tailwindcss-plain" },
];

/// Looks up a catalog skill by exact name.
#[must_use]
pub fn find_skill(name: &str) -> Option<&'static Skill> {
    SKILL_CATALOG.iter().find(|skill| skill.name == name)
}

/// Resolves selected skill names against the catalog.
///
/// Order follows the catalog, not the selection. Unknown names are dropped.
///
/// # Examples
///
/// ```
/// use folio::domain::skills::resolve_skills;
///
/// let selected = vec!["Python".to_string(), "TypeScript".to_string()];
/// let names: Vec<_> = resolve_skills(&selected).iter().map(|s| s.name).collect();
/// assert_eq!(names, vec!["TypeScript", "Python"]);
/// ```
#[must_use]
pub fn resolve_skills(selected: &[String]) -> Vec<&'static Skill> {
    for name in selected {
        if find_skill(name).is_none() {
            tracing::debug!(skill = %name, "ignoring skill missing from catalog");
        }
    }

    SKILL_CATALOG
        .iter()
        .filter(|skill| selected.iter().any(|name| name == skill.name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_resolve_once() {
        let selected = vec!["React".to_string(), "React".to_string()];
        assert_eq!(resolve_skills(&selected).len(), 1);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        assert!(find_skill("Docker").is_some());
        assert!(find_skill("docker").is_none());
    }
}
