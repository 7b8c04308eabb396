//! End-to-end mirror runs against mock sites

use page_mirror::config::{build_config, load_config};
use page_mirror::{mirror_site, CrawlConfig, MirrorReport};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a mirror configuration for the given root page
fn create_test_config(
    root_url: &str,
    output_dir: &Path,
    recursive: bool,
    max_depth: u32,
    allow_cross_domain: bool,
) -> CrawlConfig {
    CrawlConfig {
        root_url: Url::parse(root_url).expect("Failed to parse root URL"),
        output_dir: output_dir.to_path_buf(),
        recursive,
        max_depth,
        verbose: false,
        allow_cross_domain,
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html; charset=utf-8")
        .set_body_string(body)
}

async fn serve(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn run(config: CrawlConfig) -> MirrorReport {
    mirror_site(config).await.expect("Mirror run failed")
}

/// Reads one attribute of every element matching `selector` in a saved page
fn attrs(page: &Path, selector: &str, attribute: &str) -> Vec<String> {
    let content = fs::read_to_string(page).expect("Failed to read mirrored page");
    let document = scraper::Html::parse_document(&content);
    let selector = scraper::Selector::parse(selector).expect("Invalid selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr(attribute))
        .map(str::to_string)
        .collect()
}

/// Relative path -> contents of every file under `root`
fn tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                files.insert(relative, fs::read(&path).unwrap());
            }
        }
    }

    files
}

#[tokio::test]
async fn test_single_page_with_assets() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        html(
            r#"<html><head><link rel="stylesheet" href="/css/main.css"></head>
            <body><img src="photo.jpg"><a href="/about.html">About</a></body></html>"#,
        ),
    )
    .await;
    serve(
        &server,
        "/css/main.css",
        ResponseTemplate::new(200).set_body_string("body { color: red }"),
    )
    .await;
    serve(
        &server,
        "/photo.jpg",
        ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xd8, 0xff]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/about.html"))
        .respond_with(html("<p>about</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let report = run(create_test_config(
        &format!("{}/", server.uri()),
        dir.path(),
        false,
        2,
        false,
    ))
    .await;

    let files: Vec<_> = tree(dir.path()).into_keys().collect();
    assert_eq!(
        files,
        vec![
            PathBuf::from("css/main.css"),
            PathBuf::from("index.html"),
            PathBuf::from("photo.jpg"),
        ]
    );

    let index = dir.path().join("index.html");
    assert_eq!(attrs(&index, "link", "href"), vec!["css/main.css"]);
    assert_eq!(attrs(&index, "img", "src"), vec!["photo.jpg"]);
    assert_eq!(attrs(&index, "a", "href"), vec!["/about.html"]);
    assert_eq!(
        fs::read(dir.path().join("photo.jpg")).unwrap(),
        vec![0xff, 0xd8, 0xff]
    );

    assert_eq!(report.pages_written, 1);
    assert_eq!(report.assets_downloaded, 2);
    assert!(!report.cancelled);
}

#[tokio::test]
async fn test_cross_domain_image_left_remote() {
    let site = MockServer::start().await;
    let cdn = MockServer::start().await;
    let remote = format!("{}/pic.png", cdn.uri());

    serve(&site, "/", html(&format!(r#"<img src="{}">"#, remote))).await;
    serve(
        &cdn,
        "/pic.png",
        ResponseTemplate::new(200).set_body_bytes(b"PNG".to_vec()),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let report = run(create_test_config(
        &format!("{}/", site.uri()),
        dir.path(),
        false,
        2,
        false,
    ))
    .await;

    assert_eq!(attrs(&dir.path().join("index.html"), "img", "src"), vec![remote]);
    assert!(!dir.path().join("pic.png").exists());
    assert!(cdn.received_requests().await.unwrap().is_empty());
    assert_eq!(report.out_of_scope, 1);
}

#[tokio::test]
async fn test_cross_domain_image_downloaded_when_allowed() {
    let site = MockServer::start().await;
    let cdn = MockServer::start().await;

    serve(
        &site,
        "/",
        html(&format!(r#"<img src="{}/pic.png">"#, cdn.uri())),
    )
    .await;
    serve(
        &cdn,
        "/pic.png",
        ResponseTemplate::new(200).set_body_bytes(b"PNG".to_vec()),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    run(create_test_config(
        &format!("{}/", site.uri()),
        dir.path(),
        false,
        2,
        true,
    ))
    .await;

    assert_eq!(
        attrs(&dir.path().join("index.html"), "img", "src"),
        vec!["pic.png"]
    );
    assert_eq!(fs::read(dir.path().join("pic.png")).unwrap(), b"PNG");
}

#[tokio::test]
async fn test_depth_zero_does_not_follow_anchors() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        html(r#"<img src="/logo.png"><a href="/next.html">next</a>"#),
    )
    .await;
    serve(
        &server,
        "/logo.png",
        ResponseTemplate::new(200).set_body_bytes(b"logo".to_vec()),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/next.html"))
        .respond_with(html("<p>next</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    run(create_test_config(
        &format!("{}/", server.uri()),
        dir.path(),
        true,
        0,
        false,
    ))
    .await;

    let files: Vec<_> = tree(dir.path()).into_keys().collect();
    assert_eq!(
        files,
        vec![PathBuf::from("index.html"), PathBuf::from("logo.png")]
    );
    assert_eq!(
        attrs(&dir.path().join("index.html"), "a", "href"),
        vec!["/next.html"]
    );
}

#[tokio::test]
async fn test_missing_child_page_does_not_stop_parent() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        html(r#"<a href="/missing.html">gone</a><a href="/ok.html">ok</a>"#),
    )
    .await;
    serve(&server, "/missing.html", ResponseTemplate::new(404)).await;
    serve(&server, "/ok.html", html("<p>ok</p>")).await;

    let dir = tempfile::tempdir().unwrap();
    let report = run(create_test_config(
        &format!("{}/", server.uri()),
        dir.path(),
        true,
        1,
        false,
    ))
    .await;

    assert!(dir.path().join("index.html").is_file());
    assert!(dir.path().join("ok.html").is_file());
    assert!(!dir.path().join("missing.html").exists());
    assert_eq!(report.pages_written, 2);
    assert_eq!(report.pages_aborted, 1);
}

#[tokio::test]
async fn test_cycles_terminate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a.html">a</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a.html"))
        .respond_with(html(
            r#"<a href="/">home</a><a href="a.html">self</a><a href="/a.html#end">end</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let report = run(create_test_config(
        &format!("{}/", server.uri()),
        dir.path(),
        true,
        5,
        false,
    ))
    .await;

    assert_eq!(report.pages_written, 2);
    assert_eq!(
        attrs(&dir.path().join("a.html"), "a", "href"),
        vec!["index.html", "a.html", "a.html#end"]
    );
}

#[tokio::test]
async fn test_nested_page_links_are_relative() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        html(r#"<a href="/docs/guide.htm#setup">guide</a>"#),
    )
    .await;
    serve(
        &server,
        "/docs/guide.htm",
        html(r#"<img src="/img/diagram.png"><a href="../">home</a>"#),
    )
    .await;
    serve(
        &server,
        "/img/diagram.png",
        ResponseTemplate::new(200).set_body_bytes(b"diagram".to_vec()),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    run(create_test_config(
        &format!("{}/", server.uri()),
        dir.path(),
        true,
        2,
        false,
    ))
    .await;

    let index = dir.path().join("index.html");
    let guide = dir.path().join("docs").join("guide.html");

    assert_eq!(attrs(&index, "a", "href"), vec!["docs/guide.html#setup"]);
    assert_eq!(attrs(&guide, "img", "src"), vec!["../img/diagram.png"]);
    assert_eq!(attrs(&guide, "a", "href"), vec!["../index.html"]);
    assert!(dir.path().join("img").join("diagram.png").is_file());
}

#[tokio::test]
async fn test_failed_asset_keeps_remote_reference() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        html(r#"<img src="/broken.png"><script src="/app.js"></script>"#),
    )
    .await;
    serve(&server, "/broken.png", ResponseTemplate::new(404)).await;
    serve(
        &server,
        "/app.js",
        ResponseTemplate::new(200).set_body_string("void 0;"),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let report = run(create_test_config(
        &format!("{}/", server.uri()),
        dir.path(),
        false,
        2,
        false,
    ))
    .await;

    let index = dir.path().join("index.html");
    assert_eq!(attrs(&index, "img", "src"), vec!["/broken.png"]);
    assert_eq!(attrs(&index, "script", "src"), vec!["app.js"]);
    assert_eq!(report.assets_failed, 1);
    assert_eq!(report.pages_written, 1);
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        html(
            r#"<link href="/s.css"><img src="/i.png"><a href="/p/one.html">one</a><a href="/two">two</a>"#,
        ),
    )
    .await;
    serve(&server, "/s.css", ResponseTemplate::new(200).set_body_string("a{}")).await;
    serve(
        &server,
        "/i.png",
        ResponseTemplate::new(200).set_body_bytes(b"img".to_vec()),
    )
    .await;
    serve(&server, "/p/one.html", html(r#"<img src="../i.png">"#)).await;
    serve(&server, "/two", html(r#"<a href="/">back</a>"#)).await;

    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    let root = format!("{}/", server.uri());

    run(create_test_config(&root, first.path(), true, 2, false)).await;
    run(create_test_config(&root, second.path(), true, 2, false)).await;

    let first_tree = tree(first.path());
    assert_eq!(first_tree.len(), 5);
    assert_eq!(first_tree, tree(second.path()));
}

#[tokio::test]
async fn test_parent_directory_anchors_stay_inside_output() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/a/b/start.html",
        html(r#"<a href="../../../../../escape.html">up</a>"#),
    )
    .await;
    serve(&server, "/escape.html", html("<p>still inside</p>")).await;

    let dir = tempfile::tempdir().unwrap();
    run(create_test_config(
        &format!("{}/a/b/start.html", server.uri()),
        dir.path(),
        true,
        1,
        false,
    ))
    .await;

    assert!(dir.path().join("escape.html").is_file());
    assert_eq!(
        attrs(&dir.path().join("index.html"), "a", "href"),
        vec!["escape.html"]
    );
    assert!(!dir.path().parent().unwrap().join("escape.html").exists());
}

#[tokio::test]
async fn test_config_file_drives_mirror() {
    let server = MockServer::start().await;
    serve(&server, "/", html(r#"<a href="/x.html">x</a>"#)).await;
    serve(&server, "/x.html", html("<p>x</p>")).await;

    let dir = tempfile::tempdir().unwrap();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        "[mirror]\nurl = \"{}/\"\noutput = {:?}\nrecursive = true\nmax-depth = 1\n",
        server.uri(),
        dir.path().to_string_lossy()
    )
    .unwrap();

    let section = load_config(file.path()).expect("Failed to load config");
    let config = build_config(section).expect("Invalid config");
    assert_eq!(config.max_depth, 1);

    let report = run(config).await;

    assert_eq!(report.pages_written, 2);
    assert!(dir.path().join("x.html").is_file());
}

#[tokio::test]
async fn test_missing_output_directory_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("not-there");

    let section = page_mirror::config::MirrorSection {
        url: Some("https://site.test/".to_string()),
        output: Some(missing.clone()),
        ..Default::default()
    };

    assert!(matches!(
        build_config(section),
        Err(page_mirror::ConfigError::MissingOutputDir(_))
    ));
    assert!(!missing.exists());
}

#[tokio::test]
async fn test_colon_names_stay_relative() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        html(r#"<img src="/icon:big.png"><a href="/Help:Contents">help</a>"#),
    )
    .await;
    serve(
        &server,
        "/icon:big.png",
        ResponseTemplate::new(200).set_body_bytes(b"icon".to_vec()),
    )
    .await;
    serve(&server, "/Help:Contents", html("<p>help</p>")).await;

    let dir = tempfile::tempdir().unwrap();
    run(create_test_config(
        &format!("{}/", server.uri()),
        dir.path(),
        true,
        1,
        false,
    ))
    .await;

    let index = dir.path().join("index.html");
    let src = attrs(&index, "img", "src");
    let href = attrs(&index, "a", "href");
    assert_eq!(src, vec!["icon%3Abig.png"]);
    assert_eq!(href, vec!["Help%3AContents.html"]);

    // Opened from disk, both references land on the mirrored files
    let page = Url::from_file_path(&index).unwrap();
    for (reference, file) in [(&src[0], "icon:big.png"), (&href[0], "Help:Contents.html")] {
        let resolved = page.join(reference).unwrap();
        assert_eq!(resolved.scheme(), "file");
        assert_eq!(resolved.to_file_path().unwrap(), dir.path().join(file));
        assert!(dir.path().join(file).is_file());
    }
}

#[tokio::test]
async fn test_index_alias_links_to_root_copy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/index.html">home</a><a href="/about/">about</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/index.html"))
        .respond_with(html("<p>home again</p>"))
        .expect(0)
        .mount(&server)
        .await;
    serve(
        &server,
        "/about/",
        html(r#"<a href="/about/index.html">self</a>"#),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let report = run(create_test_config(
        &format!("{}/", server.uri()),
        dir.path(),
        true,
        2,
        false,
    ))
    .await;

    assert_eq!(
        attrs(&dir.path().join("index.html"), "a", "href"),
        vec!["index.html", "about/index.html"]
    );
    assert_eq!(
        attrs(&dir.path().join("about").join("index.html"), "a", "href"),
        vec!["index.html"]
    );
    assert_eq!(report.pages_written, 2);
    assert_eq!(report.pages_skipped, 2);
}
