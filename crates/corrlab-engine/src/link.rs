/*
[INPUT]:  Share URLs carrying a task identifier query parameter
[OUTPUT]: Recovered task ids and updated share URLs
[POS]:    Boundary helper - session recovery across reloads
[UPDATE]: When the share-link format changes
*/

use url::Url;

const TASK_ID_PARAM: &str = "taskId";

/// Extract the tracked task id from a share URL, if any.
///
/// A reload restarts polling against this identifier; in-memory state is
/// not recovered.
pub fn task_id_from_url(input: &str) -> Option<String> {
    let url = Url::parse(input).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == TASK_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Return the URL with the task id set.
///
/// The fragment is cleared so a fresh analysis always lands on the default
/// view.
pub fn url_with_task_id(input: &str, task_id: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(input)?;
    let retained = retained_pairs(&url);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(retained);
        pairs.append_pair(TASK_ID_PARAM, task_id);
    }
    url.set_fragment(None);
    Ok(url.into())
}

/// Return the URL with the task id and fragment removed.
pub fn url_without_task_id(input: &str) -> Result<String, url::ParseError> {
    let mut url = Url::parse(input)?;
    let retained = retained_pairs(&url);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        pairs.extend_pairs(&retained);
    }
    if retained.is_empty() {
        url.set_query(None);
    }
    url.set_fragment(None);
    Ok(url.into())
}

fn retained_pairs(url: &Url) -> Vec<(String, String)> {
    url.query_pairs()
        .filter(|(key, _)| key != TASK_ID_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}
