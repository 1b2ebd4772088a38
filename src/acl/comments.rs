//! `/ok-to-test` comment command matching

use crate::provider::CommentRecord;

/// Comment body that asks for CI to run on someone else's change
pub const OK_TO_TEST_COMMAND: &str = "/ok-to-test";

/// Exact match after trimming surrounding whitespace; no case folding
pub fn is_ok_to_test(body: &str) -> bool {
    body.trim() == OK_TO_TEST_COMMAND
}

/// Authors of `/ok-to-test` comments in comment order, each listed once
pub fn approving_authors(comments: &[CommentRecord]) -> Vec<&str> {
    let mut authors: Vec<&str> = Vec::new();
    for comment in comments.iter().filter(|c| is_ok_to_test(&c.body)) {
        let login = comment.author_login.as_str();
        if !authors.contains(&login) {
            authors.push(login);
        }
    }
    authors
}
