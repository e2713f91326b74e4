use std::fmt::{Display, Formatter, Result};

pub struct UrlToken<'a> {
    pub slug: Option<&'a str>,
    pub name: &'a str,
    pub base_url: &'a str,
    pub class: &'a str,
}

impl Display for UrlToken<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        Display::fmt(&get_link(self), f)
    }
}

/// Takes a UrlToken and returns an HTML string.
pub fn get_link(token: &UrlToken) -> String {
    if let Some(slug) = token.slug {
        format!(
            "<a class=\"{}\" href=\"/{}/{}\">{}</a>",
            token.class, token.base_url, slug, token.name
        )
    } else {
        format!("<span class=\"{}\">{}</span>", token.class, token.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linked_token() {
        let token = UrlToken {
            slug: Some("alice"),
            name: "alice",
            base_url: "members",
            class: "username",
        };
        assert_eq!(
            get_link(&token),
            "<a class=\"username\" href=\"/members/alice\">alice</a>"
        );
    }

    #[test]
    fn unlinked_token() {
        let token = UrlToken {
            slug: None,
            name: "no group",
            base_url: "groups",
            class: "group",
        };
        assert_eq!(get_link(&token), "<span class=\"group\">no group</span>");
    }
}
