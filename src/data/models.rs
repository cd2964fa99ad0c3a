use serde::{Deserialize, Serialize};

/// Profile platforms, in the order the footer lists them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Platform {
    Email,
    GitHub,
    LinkedIn,
    Twitter,
    Medium,
    DevTo,
    Instagram,
    YouTube,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::Email,
        Platform::GitHub,
        Platform::LinkedIn,
        Platform::Twitter,
        Platform::Medium,
        Platform::DevTo,
        Platform::Instagram,
        Platform::YouTube,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Platform::Email => "Email",
            Platform::GitHub => "GitHub",
            Platform::LinkedIn => "LinkedIn",
            Platform::Twitter => "Twitter",
            Platform::Medium => "Medium",
            Platform::DevTo => "DEV",
            Platform::Instagram => "Instagram",
            Platform::YouTube => "YouTube",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteProperties {
    pub name: String,
    pub title: String,
    pub email: String,
    #[serde(default)]
    pub github: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
    #[serde(default)]
    pub twitter: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    #[serde(default)]
    pub devto: Option<String>,
    #[serde(default)]
    pub instagram: Option<String>,
    #[serde(default)]
    pub youtube: Option<String>,
}

impl SiteProperties {
    /// Link target for a platform. Email links are built from the required
    /// address; everything else comes from the optional profile URLs.
    pub fn profile_url(&self, platform: Platform) -> Option<String> {
        let url = match platform {
            Platform::Email => {
                return non_empty(Some(&self.email)).map(|email| format!("mailto:{email}"));
            }
            Platform::GitHub => &self.github,
            Platform::LinkedIn => &self.linkedin,
            Platform::Twitter => &self.twitter,
            Platform::Medium => &self.medium,
            Platform::DevTo => &self.devto,
            Platform::Instagram => &self.instagram,
            Platform::YouTube => &self.youtube,
        };
        non_empty(url.as_ref()).map(str::to_string)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeroImage {
    pub name: String,
    pub src: String,
    pub alt: String,
}

impl HeroImage {
    /// Predicate matching a hero image by its lookup key.
    pub fn named(name: &str) -> impl Fn(&HeroImage) -> bool + '_ {
        move |image| image.name == name
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub url: String,
}

impl Project {
    pub fn link(&self) -> Option<&str> {
        non_empty(Some(&self.url))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutMe {
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub currently_learning: Vec<String>,
    pub detail_or_quote: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialIcons {
    #[serde(default, rename = "Email")]
    pub email: Option<String>,
    #[serde(default, rename = "GitHub", alias = "Github")]
    pub github: Option<String>,
    #[serde(default, rename = "LinkedIn", alias = "Linkedin")]
    pub linkedin: Option<String>,
    #[serde(default, rename = "Twitter")]
    pub twitter: Option<String>,
    #[serde(default, rename = "Medium")]
    pub medium: Option<String>,
    #[serde(default, rename = "DevTo", alias = "Devto")]
    pub devto: Option<String>,
    #[serde(default, rename = "Instagram")]
    pub instagram: Option<String>,
    #[serde(default, rename = "YouTube", alias = "Youtube")]
    pub youtube: Option<String>,
}

impl SocialIcons {
    pub fn icon(&self, platform: Platform) -> Option<&str> {
        let path = match platform {
            Platform::Email => &self.email,
            Platform::GitHub => &self.github,
            Platform::LinkedIn => &self.linkedin,
            Platform::Twitter => &self.twitter,
            Platform::Medium => &self.medium,
            Platform::DevTo => &self.devto,
            Platform::Instagram => &self.instagram,
            Platform::YouTube => &self.youtube,
        };
        non_empty(path.as_ref())
    }
}

fn non_empty(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}
