mod common;

use common::{body, container, options, FakeNetwork};
use microtsm::{
  bootstrap, BootstrapOutcome, FetchRequest, LocalStorage, Navigator, Page, PageEvent,
  RegistrationOptions, StartedPage, Visibility, IMPORT_MAP_OVERRIDES_KEY, WORKER_SCRIPT_URL,
};

const ENTRY: &str = "https://app.test/js/main.js";
const VUE: &str = "https://cdn.example/vue@3.4.0/dist/vue.esm-browser.js";
const ENTRY_SOURCE: &str = r##"import { createApp } from "vue";
import Button from "pkg/button";
import "./style-loader.js";
createApp(Button).mount("#app");
const page = await import(route);
"##;
const CHROME: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
                      Chrome/120.0.0.0 Safari/537.36";
const HTML: &str = r#"<!doctype html>
<html>
  <head>
    <script type="microtsm-importmap">
      {
        "imports": {
          "vue": "https://cdn.example/vue@3.4.0/dist/vue.esm-browser.js",
          "pkg/": "https://cdn.example/pkg@1.0.0/"
        }
      }
    </script>
  </head>
  <body><div id="app"></div></body>
</html>"#;

fn network() -> FakeNetwork {
  let network = FakeNetwork::default();
  network
    .script(ENTRY, ENTRY_SOURCE)
    .script("https://cdn.example/pkg@1.0.0/button/index.es.js", "export default {};");
  network
}

fn page(network: &FakeNetwork) -> Page {
  Page {
    html: HTML.to_string(),
    navigator: Navigator {
      user_agent: CHROME.to_string(),
      service_worker: Some(container(network)),
    },
    local_storage: LocalStorage::default(),
    entry_url: ENTRY.to_string(),
  }
}

async fn start(page: &Page) -> StartedPage {
  match bootstrap(page, &options()).await.unwrap() {
    BootstrapOutcome::Started(started) => started,
    BootstrapOutcome::Unsupported { document } => panic!("unexpected gate: {document}"),
  }
}

fn rewritten_entry(vue: &str) -> String {
  format!(
    r##"import {{ createApp }} from "{vue}";
import Button from "https://cdn.example/pkg@1.0.0/button/index.es.js";
import "./style-loader.js";
createApp(Button).mount("#app");
const page = await MicroTSM.load(route, import.meta.url);
"##
  )
}

#[tokio::test]
async fn bootstraps_and_loads_the_rewritten_entry() {
  let network = network();
  let page = page(&network);
  let started = start(&page).await;

  assert_eq!(body(&started.entry), rewritten_entry(VUE));
  let container = page.navigator.service_worker.as_ref().unwrap();
  assert!(container.controller(started.client).is_some());
  assert!(started.sync.is_attached());
}

#[tokio::test]
async fn stored_overrides_win_over_the_embedded_map() {
  let network = network();
  let page = page(&network);
  page
    .local_storage
    .set(IMPORT_MAP_OVERRIDES_KEY, r#"{ "vue": "http://localhost:5173/vue.js" }"#);

  let started = start(&page).await;
  assert_eq!(body(&started.entry), rewritten_entry("http://localhost:5173/vue.js"));
}

#[tokio::test]
async fn unsupported_browsers_never_register() {
  let network = network();
  let page = Page {
    navigator: Navigator {
      user_agent: "Mozilla/5.0 (Windows NT 10.0; rv:43.0) Gecko/20100101 Firefox/43.0".to_string(),
      service_worker: None,
    },
    ..page(&network)
  };

  let outcome = bootstrap(&page, &options()).await.unwrap();
  let BootstrapOutcome::Unsupported { document } = outcome else {
    panic!("firefox 43 has no service workers");
  };
  assert!(document.contains("Firefox 43 is not supported"));
  assert_eq!(network.fetches(), 0);
}

#[tokio::test]
async fn reclaimed_workers_recover_on_the_next_sync() {
  let network = network();
  let page = page(&network);
  let mut started = start(&page).await;
  let container = page.navigator.service_worker.as_ref().unwrap();

  container.terminate().unwrap();
  let controller = container.controller(started.client).unwrap();
  controller.activated().await.unwrap();
  let amnesiac = controller.fetch(FetchRequest::script(ENTRY)).await.unwrap();
  assert_eq!(
    body(&amnesiac),
    ENTRY_SOURCE.replace("import(route)", "MicroTSM.load(route, import.meta.url)")
  );

  assert!(!started.sync.handle(PageEvent::VisibilityChange(Visibility::Hidden)).unwrap());
  assert!(started.sync.handle(PageEvent::VisibilityChange(Visibility::Visible)).unwrap());
  let recovered = controller.fetch(FetchRequest::script(ENTRY)).await.unwrap();
  assert_eq!(body(&recovered), rewritten_entry(VUE));
}

#[tokio::test]
async fn relaunch_resyncs_and_unload_detaches() {
  let network = network();
  let page = page(&network);
  let mut started = start(&page).await;

  // The first activation was synced during bootstrap.
  assert!(!started.sync.handle(PageEvent::ControllerActivated).unwrap());
  assert!(started.sync.handle(PageEvent::Relaunch).unwrap());
  assert!(started.sync.handle(PageEvent::Focus).unwrap());

  started.sync.handle(PageEvent::BeforeUnload).unwrap();
  assert!(!started.sync.is_attached());
  assert!(!started.sync.handle(PageEvent::Focus).unwrap());
  assert!(!started.sync.handle(PageEvent::Relaunch).unwrap());
}

#[tokio::test]
async fn pages_opened_later_are_controlled_right_away() {
  let network = network();
  let page = page(&network);
  let first = start(&page).await;
  let container = page.navigator.service_worker.as_ref().unwrap();

  let second = container.open_client();
  let first_controller = container.controller(first.client).unwrap();
  let second_controller = container.controller(second).unwrap();
  second_controller.activated().await.unwrap();
  first_controller.activated().await.unwrap();

  // Registering again does not replace the running worker.
  container.register(WORKER_SCRIPT_URL, RegistrationOptions::module()).await.unwrap();
  let controller = container.controller(second).unwrap();
  let outcome = controller.fetch(FetchRequest::script(ENTRY)).await.unwrap();
  assert_eq!(body(&outcome), rewritten_entry(VUE));

  container.close_client(second);
  assert!(container.controller(second).is_none());
}

#[tokio::test]
async fn registration_checks_the_script_and_its_type() {
  let network = network();
  let container = container(&network);
  let client = container.open_client();

  assert!(container.register("/other.sw.js", RegistrationOptions::module()).await.is_err());
  assert!(container.register(WORKER_SCRIPT_URL, RegistrationOptions::default()).await.is_err());
  assert!(container.controller(client).is_none());

  container.register(WORKER_SCRIPT_URL, RegistrationOptions::module()).await.unwrap();
  assert!(container.controller(client).is_some());
}

#[tokio::test]
async fn a_missing_data_island_leaves_everything_unresolved() {
  let network = network();
  let page = Page { html: "<html><body></body></html>".to_string(), ..page(&network) };
  let started = start(&page).await;
  assert_eq!(
    body(&started.entry),
    ENTRY_SOURCE.replace("import(route)", "MicroTSM.load(route, import.meta.url)")
  );
}
