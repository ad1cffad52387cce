use url::Url;

/// CSS selectors for one job board.
///
/// `link` points at the job's own anchor: the apply/detail link on a
/// posting, the card link on a results page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectorProfile {
    pub title: &'static str,
    pub company: &'static str,
    pub location: &'static str,
    pub description: &'static str,
    pub date_posted: &'static str,
    pub link: &'static str,
}

/// Job boards with a known markup profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Indeed,
    LinkedIn,
    Glassdoor,
    Monster,
    CareerBuilder,
    SimplyHired,
    Wellfound,
    ZipRecruiter,
    WeWorkRemotely,
    FlexJobs,
    UsaJobs,
    Adzuna,
    WayUp,
    Handshake,
    CollegeRecruiter,
    AiJobs,
    Jobberman,
    JobStreet,
    Unknown,
}

/// Host fragment identifying each site, checked in order.
const HOST_PATTERNS: &[(&str, Site)] = &[
    ("indeed.", Site::Indeed),
    ("linkedin.", Site::LinkedIn),
    ("glassdoor.", Site::Glassdoor),
    ("monster.", Site::Monster),
    ("careerbuilder.", Site::CareerBuilder),
    ("simplyhired.", Site::SimplyHired),
    ("wellfound.", Site::Wellfound),
    ("ziprecruiter.", Site::ZipRecruiter),
    ("weworkremotely.", Site::WeWorkRemotely),
    ("flexjobs.", Site::FlexJobs),
    ("usajobs.", Site::UsaJobs),
    ("adzuna.", Site::Adzuna),
    ("wayup.", Site::WayUp),
    ("joinhandshake.", Site::Handshake),
    ("collegerecruiter.", Site::CollegeRecruiter),
    ("ai-jobs.", Site::AiJobs),
    ("jobberman.", Site::Jobberman),
    ("jobstreet.", Site::JobStreet),
];

const INDEED: SelectorProfile = SelectorProfile {
    title: "h2.jobTitle",
    company: "span.companyName",
    location: "div.companyLocation",
    description: "div.job-snippet",
    date_posted: "span.date",
    link: "a.jcs-JobTitle",
};

const LINKEDIN: SelectorProfile = SelectorProfile {
    title: "h3.base-search-card__title",
    company: "h4.base-search-card__subtitle",
    location: "span.job-search-card__location",
    description: "div.description__text",
    date_posted: "time",
    link: "a.base-card__full-link",
};

const GLASSDOOR: SelectorProfile = SelectorProfile {
    title: "h2.jobTitle",
    company: "span.employerName",
    location: "div.location",
    description: "div.jobDescriptionContent",
    date_posted: "span.job-posted-date",
    link: "a.jobLink",
};

const MONSTER: SelectorProfile = SelectorProfile {
    title: "h2.title",
    company: "div.company",
    location: "div.location",
    description: "div.summary",
    date_posted: "time",
    link: "a.job-link",
};

const CAREERBUILDER: SelectorProfile = SelectorProfile {
    title: "h2.job-title",
    company: "div.data-results-company",
    location: "div.data-results-location",
    description: "div.data-results-snippet",
    date_posted: "div.data-results-publish-time",
    link: "a.data-results-content",
};

const SIMPLYHIRED: SelectorProfile = SelectorProfile {
    title: "a.jobposting-title",
    company: "span.jobposting-company",
    location: "span.jobposting-location",
    description: "div.jobposting-snippet",
    date_posted: "span.jobposting-date",
    link: "a.jobposting-title",
};

const WELLFOUND: SelectorProfile = SelectorProfile {
    title: "a.styles_title__EyX8U",
    company: "div.styles_company__aM2ke",
    location: "div.styles_location__NMX1W",
    description: "div.styles_description__Otby1",
    date_posted: "div.styles_posted__rp8r7",
    link: "a.styles_title__EyX8U",
};

const ZIPRECRUITER: SelectorProfile = SelectorProfile {
    title: "h2.job_title",
    company: "div.company_name",
    location: "div.job_location",
    description: "div.job_snippet",
    date_posted: "time",
    link: "a.job_link",
};

const WEWORKREMOTELY: SelectorProfile = SelectorProfile {
    title: "span.title",
    company: "span.company",
    location: "span.region",
    description: "div.listing-container",
    date_posted: "time",
    link: "a.listing",
};

const FLEXJOBS: SelectorProfile = SelectorProfile {
    title: "span.job-title",
    company: "span.job-company",
    location: "span.job-location",
    description: "div.job-description",
    date_posted: "span.job-age",
    link: "a.job-link",
};

const USAJOBS: SelectorProfile = SelectorProfile {
    title: "h2.usajobs-search-result--core-heading",
    company: "h3.usajobs-search-result--agency",
    location: "span.usajobs-search-result--location",
    description: "div.usajobs-search-result--summary",
    date_posted: "span.usajobs-search-result--open-date",
    link: "a.usajobs-search-result--core",
};

const ADZUNA: SelectorProfile = SelectorProfile {
    title: "a.job-title",
    company: "div.company",
    location: "div.location",
    description: "div.snippet",
    date_posted: "span.date",
    link: "a.job-title",
};

const WAYUP: SelectorProfile = SelectorProfile {
    title: "h2.job-title",
    company: "div.job-company",
    location: "div.job-location",
    description: "div.job-description",
    date_posted: "time",
    link: "a.job-link",
};

const HANDSHAKE: SelectorProfile = SelectorProfile {
    title: "h3.job-title",
    company: "div.job-employer",
    location: "div.job-location",
    description: "div.job-description",
    date_posted: "time",
    link: "a.job-link",
};

const COLLEGERECRUITER: SelectorProfile = SelectorProfile {
    title: "h2.job-title",
    company: "span.company",
    location: "span.location",
    description: "div.job-snippet",
    date_posted: "span.posted",
    link: "a.job-link",
};

const AIJOBS: SelectorProfile = SelectorProfile {
    title: "h2.job-title",
    company: "div.company",
    location: "div.location",
    description: "div.description",
    date_posted: "time",
    link: "a.job-link",
};

const JOBBERMAN: SelectorProfile = SelectorProfile {
    title: "h3.job-title",
    company: "span.company-name",
    location: "span.job-location",
    description: "div.job-description",
    date_posted: "span.job-date",
    link: "a.job-link",
};

const JOBSTREET: SelectorProfile = SelectorProfile {
    title: "h3.job-title",
    company: "span.company-name",
    location: "span.job-location",
    description: "div.job-description",
    date_posted: "span.job-date",
    link: "a.job-link",
};

impl Site {
    /// Identify the board from the URL's host. Unparseable URLs are `Unknown`.
    pub fn detect(url: &str) -> Site {
        let Some(host) = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
        else {
            return Site::Unknown;
        };
        HOST_PATTERNS
            .iter()
            .find(|(pattern, _)| host.contains(pattern))
            .map(|(_, site)| *site)
            .unwrap_or(Site::Unknown)
    }

    pub fn profile(&self) -> Option<&'static SelectorProfile> {
        let profile = match self {
            Site::Indeed => &INDEED,
            Site::LinkedIn => &LINKEDIN,
            Site::Glassdoor => &GLASSDOOR,
            Site::Monster => &MONSTER,
            Site::CareerBuilder => &CAREERBUILDER,
            Site::SimplyHired => &SIMPLYHIRED,
            Site::Wellfound => &WELLFOUND,
            Site::ZipRecruiter => &ZIPRECRUITER,
            Site::WeWorkRemotely => &WEWORKREMOTELY,
            Site::FlexJobs => &FLEXJOBS,
            Site::UsaJobs => &USAJOBS,
            Site::Adzuna => &ADZUNA,
            Site::WayUp => &WAYUP,
            Site::Handshake => &HANDSHAKE,
            Site::CollegeRecruiter => &COLLEGERECRUITER,
            Site::AiJobs => &AIJOBS,
            Site::Jobberman => &JOBBERMAN,
            Site::JobStreet => &JOBSTREET,
            Site::Unknown => return None,
        };
        Some(profile)
    }

    /// Sites that serve an empty shell to plain HTTP clients.
    pub fn requires_browser(&self) -> bool {
        matches!(self, Site::LinkedIn)
    }
}
