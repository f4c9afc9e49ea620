//! URL construction for the request service's REST dialect.
//!
//! Every request URL is built here so a misconfigured base URL (trailing
//! slashes) is normalized the same way for every call.

/// Version prefix appended to every configured base URL.
pub const API_PREFIX: &str = "/api/v1";

/// Page size used when listing outstanding requests.
pub const REQUEST_LIST_COUNT: u32 = 1000;

/// Strip trailing slashes from a configured base URL and append the API prefix.
pub fn api_base(base_url: &str) -> String {
    format!("{}{API_PREFIX}", base_url.trim().trim_end_matches('/'))
}

pub fn search_info(base_url: &str, external_id: &str) -> String {
    format!("{}/Search/movie/info/{external_id}", api_base(base_url))
}

pub fn availability(base_url: &str, external_id: &str) -> String {
    format!("{}/Request/movie/available/{external_id}", api_base(base_url))
}

pub fn search_title(base_url: &str, term: &str) -> String {
    format!(
        "{}/Search/movie/{}",
        api_base(base_url),
        urlencoding::encode(term)
    )
}

pub fn request_list(base_url: &str) -> String {
    format!(
        "{}/Request/movie?count={REQUEST_LIST_COUNT}&statusType=1&availabilityType=1",
        api_base(base_url)
    )
}

pub fn request_total(base_url: &str) -> String {
    format!("{}/Request/movie/total", api_base(base_url))
}

pub fn submit_request(base_url: &str) -> String {
    format!("{}/Request/movie", api_base(base_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_normalize_to_same_base() {
        let expected = "http://host/api/v1";
        assert_eq!(api_base("http://host"), expected);
        assert_eq!(api_base("http://host/"), expected);
        assert_eq!(api_base("http://host///"), expected);
    }

    #[test]
    fn keeps_reverse_proxy_subpaths() {
        assert_eq!(
            search_info("https://example.com/ombi/", "438631"),
            "https://example.com/ombi/api/v1/Search/movie/info/438631"
        );
    }

    #[test]
    fn title_term_is_percent_encoded() {
        assert_eq!(
            search_title("http://host", "Dune 2021"),
            "http://host/api/v1/Search/movie/Dune%202021"
        );
        assert_eq!(
            search_title("http://host", "AC/DC: Live"),
            "http://host/api/v1/Search/movie/AC%2FDC%3A%20Live"
        );
    }

    #[test]
    fn request_list_carries_filters() {
        assert_eq!(
            request_list("http://host/"),
            "http://host/api/v1/Request/movie?count=1000&statusType=1&availabilityType=1"
        );
    }
}
