//! Query terms → structured predicate.

use cs_protocol::{Comparison, Field, Predicate};

use crate::query::Term;

/// Fields a bare keyword or quoted phrase is searched in.
pub const KEYWORD_FIELDS: [Field; 7] = [
    Field::Raw,
    Field::Message,
    Field::Service,
    Field::User,
    Field::Action,
    Field::Endpoint,
    Field::Host,
];

/// AND of every term. No terms compiles to the always-true predicate.
pub fn compile(terms: &[Term]) -> Predicate {
    Predicate::All(terms.iter().map(compile_term).collect())
}

pub fn compile_term(term: &Term) -> Predicate {
    match term {
        Term::FieldEquals { field, value } => Comparison::equals(*field, value.clone()).into(),
        Term::FieldContains { field, value } => Predicate::field_contains(*field, value),
        Term::Keyword(text) => Predicate::Any(
            KEYWORD_FIELDS
                .iter()
                .map(|f| Predicate::field_contains(*f, text))
                .collect(),
        ),
        Term::Since(bound) => Comparison::TimestampAtLeast { bound: *bound }.into(),
        Term::Until(bound) => Comparison::TimestampAtMost { bound: *bound }.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use cs_protocol::{LogType, Record};

    fn auth_record() -> Record {
        let mut r = Record::new(
            LogType::Auth,
            "Jan 12 11:40:01 web01 sshd[1234]: Failed password for root from 192.168.1.50",
        );
        r.timestamp = "2025-01-12T11:40:01".into();
        r.host = Some("web01".into());
        r.service = Some("sshd".into());
        r.user = Some("root".into());
        r.action = Some("login_failure".into());
        r.ip = Some("192.168.1.50".into());
        r
    }

    #[test]
    fn no_terms_is_always() {
        assert!(compile(&[]).is_always());
    }

    #[test]
    fn keyword_searches_raw_case_insensitively() {
        let p = compile(&[Term::Keyword("FAILED PASSWORD".into())]);
        assert!(p.matches(&auth_record()));

        let p = compile(&[Term::Keyword("nginx".into())]);
        assert!(!p.matches(&auth_record()));
    }

    #[test]
    fn keyword_reaches_other_fields() {
        let mut r = Record::new(LogType::Json, "{}");
        r.message = Some("port_scan".into());
        assert!(compile(&[Term::Keyword("scan".into())]).matches(&r));
    }

    #[test]
    fn terms_combine_with_and() {
        let r = auth_record();
        let hit = compile(&[
            Term::FieldEquals {
                field: Field::Ip,
                value: "192.168.1.50".into(),
            },
            Term::FieldContains {
                field: Field::Action,
                value: "FAILURE".into(),
            },
            Term::Since(Utc.with_ymd_and_hms(2025, 1, 12, 11, 0, 0).unwrap()),
        ]);
        assert!(hit.matches(&r));

        let miss = compile(&[
            Term::FieldEquals {
                field: Field::Ip,
                value: "192.168.1.50".into(),
            },
            Term::Until(Utc.with_ymd_and_hms(2025, 1, 12, 11, 0, 0).unwrap()),
        ]);
        assert!(!miss.matches(&r));
    }

    #[tokio::test]
    async fn keyword_predicate_runs_on_sqlite() {
        use cs_store::{SqliteStore, Store};

        let store = SqliteStore::in_memory().await.unwrap();
        store.insert(auth_record()).await;
        let mut scan = Record::new(LogType::Json, r#"{"event":"port_scan"}"#);
        scan.message = Some("port_scan".into());
        store.insert(scan).await;
        store.insert(Record::new(LogType::Generic, "nothing to see")).await;
        store.commit().await.unwrap();

        let phrase = compile(&[Term::Keyword("failed PASSWORD".into())]);
        let rows = store.query(&phrase, 10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user.as_deref(), Some("root"));

        // Matches through the message column and through raw.
        let scan = compile(&[Term::Keyword("SCAN".into())]);
        assert_eq!(store.count(&scan).await.unwrap(), 1);

        let both = compile(&[
            Term::Keyword("sshd".into()),
            Term::FieldEquals {
                field: Field::Ip,
                value: "192.168.1.50".into(),
            },
        ]);
        assert_eq!(store.count(&both).await.unwrap(), 1);

        let miss = compile(&[Term::Keyword("nginx".into())]);
        assert_eq!(store.count(&miss).await.unwrap(), 0);
    }

    #[test]
    fn equality_is_exact() {
        let p = compile(&[Term::FieldEquals {
            field: Field::Ip,
            value: "192.168.1.5".into(),
        }]);
        assert!(!p.matches(&auth_record()));
    }
}
