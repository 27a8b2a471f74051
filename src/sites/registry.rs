use crate::sites::{JsonItems, SiteProfile};
use crate::{ConfigError, TrawlError};
use std::collections::BTreeMap;

/// Lookup table from site id to its search profile
///
/// The registry is built once at startup and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct SiteRegistry {
    profiles: BTreeMap<String, SiteProfile>,
}

impl SiteRegistry {
    /// Builds a registry from explicit profiles, validating each one
    ///
    /// A later profile with the same id replaces an earlier one.
    pub fn new(profiles: impl IntoIterator<Item = SiteProfile>) -> Result<Self, ConfigError> {
        let mut map = BTreeMap::new();
        for profile in profiles {
            profile.validate()?;
            map.insert(profile.id.clone(), profile);
        }
        Ok(Self { profiles: map })
    }

    /// The registry of supported publishers
    pub fn builtin() -> Self {
        Self {
            profiles: builtin_profiles()
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
        }
    }

    /// Adds or replaces profiles, e.g. from the `[[site]]` config tables
    pub fn with_overrides(
        mut self,
        profiles: impl IntoIterator<Item = SiteProfile>,
    ) -> Result<Self, ConfigError> {
        for profile in profiles {
            profile.validate()?;
            tracing::debug!("Registering site profile '{}'", profile.id);
            self.profiles.insert(profile.id.clone(), profile);
        }
        Ok(self)
    }

    /// Looks up a site by id (case-sensitive)
    pub fn profile(&self, site: &str) -> Result<&SiteProfile, TrawlError> {
        self.profiles
            .get(site)
            .ok_or_else(|| TrawlError::UnknownSite(site.to_string()))
    }

    pub fn contains(&self, site: &str) -> bool {
        self.profiles.contains_key(site)
    }

    /// Registered ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn profiles(&self) -> impl Iterator<Item = &SiteProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl Default for SiteRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_profiles() -> Vec<SiteProfile> {
    vec![
        SiteProfile::direct(
            "time",
            "+",
            "https://time.com/search/?q={keyword}&page={page}",
            "media-img margin-8-bottom",
        ),
        SiteProfile::api(
            "foxnews",
            "%20",
            "https://api.foxnews.com/search/web?q={keyword}\
             +-filetype:amp+-filetype:xml+more:pagemap:metatags-prism.section\
             +more:pagemap:metatags-pagetype:article+more:pagemap:metatags-dc.type:Text.Article\
             &siteSearch=foxnews.com&siteSearchFilter=i&sort=date:r:{begin}:{end}\
             &start={prev_page}1&callback=__jp5",
            &["items"],
            JsonItems::Field("link".to_string()),
        ),
        SiteProfile::api(
            "CNN",
            "+",
            "https://search.api.cnn.com/content?q={keyword}&size=10&from={offset}\
             &page={page}&sort=relevance&types=article",
            &["result"],
            JsonItems::FieldIfPresent("url".to_string()),
        ),
        SiteProfile::rendered(
            "ABC",
            "%2520",
            "https://abcnews.go.com/search?searchtext={keyword}&type=Story&page={page}",
            "AnchorLink",
        )
        .within("Search__body__wrapper w-100"),
        SiteProfile::direct(
            "spectator",
            "%20",
            "https://spectator.org/page/{page}/?s={keyword}",
            "",
        )
        .within("main-loop"),
        SiteProfile::api(
            "blaze",
            "%2B",
            "https://www.theblaze.com/res/load_more_posts/data.js?site_id=19257436\
             &node_id=%2Froot%2Fblocks%2Fblock%5Bsearch%5D%2Fabtests%2Fabtest%5B1%5D%2F\
             element_wrapper%2Fchoose%2Fotherwise%2Felement_wrapper%5B2%5D%2F\
             element_wrapper%5B2%5D%2Fchoose%2Fotherwise%2Fposts-\
             &resource_id=search_US+good&path_params=%7B%7D&formats=html&q={keyword}\
             &rm_lazy_load=1&exclude_post_ids=&pn={page}&pn_strategy=",
            &["posts_html"],
            JsonItems::HtmlAnchors("widget__headline-text custom-post-headline".to_string()),
        ),
        SiteProfile::api(
            "dailycaller",
            "%20",
            "https://cse.google.com/cse/element/v1?rsz=filtered_cse&num=10&hl=en\
             &source=gcsc&gss=.com&start={next_offset}&cselibv=c23214b953e32f29\
             &cx=013858372769713515008:m9uq4uupsfm&q={keyword}&safe=off\
             &cse_tok=ALwrddFDewNY08F8bYp5sX7stOM4:1677412988743&exp=csqr,cc\
             &callback=google.search.cse.api3335",
            &["results"],
            JsonItems::Field("clicktrackUrl".to_string()),
        ),
        SiteProfile::direct(
            "federalist",
            "+",
            "https://thefederalist.com/page/{page}/?s={keyword}",
            "d-block position-relative mb-20",
        ),
        SiteProfile::direct(
            "nypost",
            "+",
            "https://nypost.com/search/{keyword}/page/{page}/",
            "postid",
        ),
    ]
}
