use rstest::rstest;

use crate::{error::Error, url::RepositoryUrl};

use super::{BitbucketRepository, GitHubRepository};

fn url(src: &str) -> RepositoryUrl {
    src.parse().unwrap()
}

#[rstest]
#[case("https://github.com/cashapp/protosync.git")]
#[case("ssh://git@github.com/cashapp/protosync.git")]
#[case("git@github.com:cashapp/protosync.git")]
fn test_github_repository(#[case] src: &str) {
    assert_eq!(GitHubRepository::from_url(&url(src)), Ok(GitHubRepository {
        user: "cashapp".to_string(),
        project: "protosync".to_string(),
    }));
}

#[rstest]
#[case("https://github.com/cashapp.git")]
#[case("https://github.com/cashapp/protosync/extra.git")]
#[case("https://github.com/")]
fn test_github_repository_invalid(#[case] src: &str) {
    assert!(matches!(GitHubRepository::from_url(&url(src)), Err(Error::InvalidGitHubPath(_))));
}

#[test]
fn test_bitbucket_repository() {
    assert_eq!(BitbucketRepository::from_url(&url("ssh://git@bitbucket.example.com:7999/scm/mycompany/myservice.git")), Ok(BitbucketRepository {
        project: "mycompany".to_string(),
        repo: "myservice".to_string(),
    }));
}

#[rstest]
#[case("https://bitbucket.example.com/projects/mycompany/myservice.git")]
#[case("https://bitbucket.example.com/scm/mycompany.git")]
#[case("https://bitbucket.example.com/scm/a/b/c.git")]
fn test_bitbucket_repository_invalid(#[case] src: &str) {
    assert!(matches!(BitbucketRepository::from_url(&url(src)), Err(Error::InvalidBitbucketPath(_))));
}
