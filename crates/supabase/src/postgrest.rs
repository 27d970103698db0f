//! PostgREST query-string encoding and count parsing.
//!
//! Filters become `<column>=<op>.<value>` pairs: `eq.` for equality and
//! `in.(a,b)` for membership. Values inside an `in` list that contain
//! PostgREST's reserved characters are double-quoted.

use perspecto_db::backend::{Filter, Query};

/// Path prefix of the REST service.
pub const REST_PATH: &str = "/rest/v1";

/// URL of a table endpoint.
pub fn table_url(base_url: &str, table: &str) -> String {
    format!("{base_url}{REST_PATH}/{table}")
}

/// Query-string pairs selecting every column of the rows matching `query`.
pub fn select_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(query));
    params
}

/// Query-string pairs for the filters of `query` alone.
pub fn filter_params(query: &Query) -> Vec<(String, String)> {
    query
        .filters()
        .iter()
        .map(|filter| match filter {
            Filter::Eq { column, value } => (column.clone(), format!("eq.{value}")),
            Filter::In { column, values } => {
                let list: Vec<String> = values.iter().map(|v| quote_list_item(v)).collect();
                (column.clone(), format!("in.({})", list.join(",")))
            }
        })
        .collect()
}

fn quote_list_item(value: &str) -> String {
    let reserved = value
        .chars()
        .any(|c| matches!(c, ',' | '(' | ')' | '"' | ':') || c.is_whitespace());
    if reserved {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

/// Total row count from a `Content-Range` header such as `0-24/3573` or
/// `*/0`. An unknown total (`*/*`) yields `None`.
pub fn parse_content_range_total(header: &str) -> Option<u64> {
    let (_, total) = header.trim().rsplit_once('/')?;
    total.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(params: &[(String, String)]) -> Vec<(&str, &str)> {
        params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn select_starts_with_star() {
        let params = select_params(&Query::new().eq("ownerId", "u1"));
        assert_eq!(pairs(&params), vec![("select", "*"), ("ownerId", "eq.u1")]);
    }

    #[test]
    fn in_filter_joins_values() {
        let params = filter_params(&Query::new().is_in("annotationId", ["a1", "a2"]));
        assert_eq!(pairs(&params), vec![("annotationId", "in.(a1,a2)")]);
    }

    #[test]
    fn in_filter_quotes_reserved_values() {
        let params = filter_params(&Query::new().is_in("name", ["a,b", "c"]));
        assert_eq!(pairs(&params), vec![("name", "in.(\"a,b\",c)")]);
    }

    #[test]
    fn empty_in_list_is_encoded_empty() {
        let params = filter_params(&Query::new().is_in("id", Vec::<String>::new()));
        assert_eq!(pairs(&params), vec![("id", "in.()")]);
    }

    #[test]
    fn content_range_totals() {
        assert_eq!(parse_content_range_total("0-24/3573"), Some(3573));
        assert_eq!(parse_content_range_total("*/0"), Some(0));
        assert_eq!(parse_content_range_total("*/*"), None);
        assert_eq!(parse_content_range_total("garbage"), None);
    }

    #[test]
    fn table_url_joins_rest_prefix() {
        assert_eq!(
            table_url("https://p.supabase.co", "videos"),
            "https://p.supabase.co/rest/v1/videos"
        );
    }
}
