//! Template search predicates.
//!
//! A [`SearchPredicate`] is a conjunction of independent [`Clause`]s built from a
//! [`TemplateFilter`]. Absent or blank filters contribute no clause, so an empty
//! predicate selects every template. The storage layer renders the predicate to a
//! SQL `WHERE` fragment with positional parameters.

use std::collections::BTreeSet;

use rusqlite::types::Value;

use crate::storage::models::TemplateFilter;

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Owned by this member.
    Owner(i64),
    /// Filed under this category.
    Category(i64),
    /// Trimmed, case-sensitive substring of the title, description, or any
    /// source file's name or content.
    Keyword(String),
    /// Tagged with every one of these tag ids. Sorted and de-duplicated.
    AllTags(Vec<i64>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPredicate {
    clauses: Vec<Clause>,
}

impl SearchPredicate {
    pub fn from_filter(filter: &TemplateFilter) -> Self {
        let mut predicate = Self::default();
        if let Some(member_id) = filter.member_id {
            predicate.clauses.push(Clause::Owner(member_id));
        }
        if let Some(category_id) = filter.category_id {
            predicate.clauses.push(Clause::Category(category_id));
        }
        if let Some(keyword) = filter.keyword.as_deref().map(str::trim) {
            if !keyword.is_empty() {
                predicate.clauses.push(Clause::Keyword(keyword.to_string()));
            }
        }
        let tag_ids: BTreeSet<i64> = filter.tag_ids.iter().copied().collect();
        if !tag_ids.is_empty() {
            predicate
                .clauses
                .push(Clause::AllTags(tag_ids.into_iter().collect()));
        }
        predicate
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Renders `WHERE ...` (or an empty string) over the `templates` table,
    /// with the values to bind in order.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut conditions = Vec::with_capacity(self.clauses.len());
        let mut params: Vec<Value> = Vec::new();

        for clause in &self.clauses {
            match clause {
                Clause::Owner(id) => {
                    conditions.push("templates.member_id = ?".to_string());
                    params.push(Value::Integer(*id));
                }
                Clause::Category(id) => {
                    conditions.push("templates.category_id = ?".to_string());
                    params.push(Value::Integer(*id));
                }
                Clause::Keyword(keyword) => {
                    // instr() is case-sensitive and treats % and _ literally.
                    conditions.push(
                        "(instr(templates.title, ?) > 0
                          OR instr(templates.description, ?) > 0
                          OR templates.id IN (
                              SELECT sc.template_id FROM source_codes sc
                              WHERE instr(sc.content, ?) > 0 OR instr(sc.filename, ?) > 0))"
                            .to_string(),
                    );
                    for _ in 0..4 {
                        params.push(Value::Text(keyword.clone()));
                    }
                }
                Clause::AllTags(ids) => {
                    conditions.push(format!(
                        "templates.id IN (
                            SELECT tt.template_id FROM template_tags tt
                            WHERE tt.tag_id IN ({})
                            GROUP BY tt.template_id
                            HAVING COUNT(DISTINCT tt.tag_id) = ?)",
                        placeholders(ids.len())
                    ));
                    params.extend(ids.iter().map(|id| Value::Integer(*id)));
                    params.push(Value::Integer(ids.len() as i64));
                }
            }
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        (where_clause, params)
    }
}

/// `?, ?, ?` for an `IN (...)` list of `n` values.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_has_no_clauses() {
        let predicate = SearchPredicate::from_filter(&TemplateFilter::default());
        assert!(predicate.is_empty());
        let (sql, params) = predicate.to_sql();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let predicate = SearchPredicate::from_filter(&TemplateFilter {
            keyword: Some("   ".to_string()),
            ..Default::default()
        });
        assert!(predicate.is_empty());
    }

    #[test]
    fn test_keyword_is_trimmed_not_lowercased() {
        let predicate = SearchPredicate::from_filter(&TemplateFilter {
            keyword: Some("  Hello ".to_string()),
            ..Default::default()
        });
        assert_eq!(predicate.clauses(), &[Clause::Keyword("Hello".to_string())]);
    }

    #[test]
    fn test_tag_ids_are_deduplicated() {
        let predicate = SearchPredicate::from_filter(&TemplateFilter {
            tag_ids: vec![3, 1, 3, 2],
            ..Default::default()
        });
        assert_eq!(predicate.clauses(), &[Clause::AllTags(vec![1, 2, 3])]);
        let (_, params) = predicate.to_sql();
        assert_eq!(params.last(), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_all_filters_joined_with_and() {
        let predicate = SearchPredicate::from_filter(&TemplateFilter {
            member_id: Some(1),
            keyword: Some("print".to_string()),
            category_id: Some(2),
            tag_ids: vec![5],
        });
        assert_eq!(predicate.clauses().len(), 4);
        let (sql, params) = predicate.to_sql();
        assert!(sql.starts_with("WHERE "));
        assert_eq!(sql.matches(" AND ").count(), 3);
        // owner, category, keyword x4, one tag id, tag count
        assert_eq!(params.len(), 8);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
